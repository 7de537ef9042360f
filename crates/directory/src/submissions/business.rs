//! Business-listing submission flow.

use std::sync::Arc;

use chrono::Utc;
use townboard_core::{Category, UserId};
use tracing::{info, warn};

use crate::backend::{ListingInsert, ObjectStore};
use crate::device::{AssetRef, AssetSource, Locator};
use crate::entitlement::EntitlementCache;
use crate::error::Result;
use crate::gateway::DirectoryGateway;

use super::{image_content_type, require, video_content_type, SubmissionError};

/// Number of image slots a listing form offers.
pub const IMAGE_SLOTS: usize = 7;

/// Storage folder for listings submitted without a signed-in owner.
const ANONYMOUS_FOLDER: &str = "anonymous";

/// In-progress listing form.
///
/// Image slots are positional; empty slots are skipped at upload time but
/// the occupied ones keep their relative order.
#[derive(Debug, Clone, Default)]
pub struct BusinessForm {
    pub name: String,
    pub category: String,
    pub owner_name: String,
    pub phone: String,
    pub description: String,
    pub reference_id: String,
    pub address: String,
    pub working_hours: String,
    pub supports_home_delivery: bool,
    pub images: [Option<AssetRef>; IMAGE_SLOTS],
    pub video: Option<AssetRef>,
}

impl BusinessForm {
    fn validate(&self) -> Result<Category, SubmissionError> {
        require(&self.name, "name")?;
        let category = Category::parse(&self.category)
            .map_err(|_| SubmissionError::MissingField("category"))?;
        if self.images.iter().all(Option::is_none) {
            return Err(SubmissionError::NoImages);
        }
        Ok(category)
    }
}

/// Runs the premium-gated listing submission.
pub struct BusinessSubmitter {
    entitlement: EntitlementCache,
    gateway: DirectoryGateway,
    storage: Arc<dyn ObjectStore>,
    assets: Arc<dyn AssetSource>,
    locator: Arc<dyn Locator>,
    bucket: String,
}

impl BusinessSubmitter {
    #[must_use]
    pub fn new(
        entitlement: EntitlementCache,
        gateway: DirectoryGateway,
        storage: Arc<dyn ObjectStore>,
        assets: Arc<dyn AssetSource>,
        locator: Arc<dyn Locator>,
        bucket: String,
    ) -> Self {
        Self {
            entitlement,
            gateway,
            storage,
            assets,
            locator,
            bucket,
        }
    }

    /// Submit the form as `owner` (or anonymously).
    ///
    /// The premium gate and field validation run before any upload or
    /// insert. On success the form is reset to its initial state; on
    /// failure it is left untouched so the caller can retry.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmissionError`] for gate/validation rejections, or
    /// the upload/insert failure that aborted the flow.
    pub async fn submit(&self, form: &mut BusinessForm, owner: Option<UserId>) -> Result<()> {
        if !self.entitlement.is_premium() {
            return Err(SubmissionError::PremiumRequired.into());
        }
        let category = form.validate()?;
        if !category.is_listed() {
            info!(%category, "submitting listing with an unlisted category");
        }

        let coordinates = match self.locator.current_fix().await {
            Ok(fix) => fix.map(|fix| fix.coordinates),
            Err(error) => {
                warn!(%error, "location fix failed; submitting without coordinates");
                None
            }
        };

        let folder = owner.map_or_else(|| ANONYMOUS_FOLDER.to_string(), |id| id.to_string());
        let stamp = Utc::now().timestamp_millis();

        let mut image_urls = Vec::new();
        for (position, asset) in form.images.iter().flatten().enumerate() {
            let url = self
                .upload_image(asset, &folder, stamp, position + 1)
                .await?;
            image_urls.push(url);
        }

        let video_url = match &form.video {
            Some(asset) => Some(self.upload_video(asset, &folder, stamp).await?),
            None => None,
        };

        let insert = ListingInsert {
            owner_id: owner.unwrap_or_else(UserId::anonymous),
            name: form.name.trim().to_string(),
            category: category.as_str().to_string(),
            owner_name: form.owner_name.clone(),
            phone: form.phone.clone(),
            description: form.description.clone(),
            reference_id: form.reference_id.clone(),
            address: form.address.clone(),
            latitude: coordinates.map(|c| c.latitude()),
            longitude: coordinates.map(|c| c.longitude()),
            working_hours: form.working_hours.clone(),
            supports_home_delivery: form.supports_home_delivery,
            image_urls,
            video_url,
        };
        self.gateway.add_listing(&insert).await?;

        info!(name = %insert.name, "business listing submitted");
        *form = BusinessForm::default();
        Ok(())
    }

    async fn upload_image(
        &self,
        asset: &AssetRef,
        folder: &str,
        stamp: i64,
        position: usize,
    ) -> Result<String> {
        let loaded = self.assets.load(asset).await?;
        let extension = loaded.extension.unwrap_or_else(|| "jpg".to_string());
        let path = format!("{folder}/{stamp}_image_{position}.{extension}");
        self.storage
            .upload(
                &self.bucket,
                &path,
                loaded.bytes,
                &image_content_type(&extension),
                true,
            )
            .await?;
        Ok(self.storage.public_url(&self.bucket, &path))
    }

    async fn upload_video(&self, asset: &AssetRef, folder: &str, stamp: i64) -> Result<String> {
        let loaded = self.assets.load(asset).await?;
        let extension = loaded.extension.unwrap_or_else(|| "mp4".to_string());
        let path = format!("{folder}/{stamp}_video_main.{extension}");
        self.storage
            .upload(
                &self.bucket,
                &path,
                loaded.bytes,
                &video_content_type(&extension),
                true,
            )
            .await?;
        Ok(self.storage.public_url(&self.bucket, &path))
    }
}
