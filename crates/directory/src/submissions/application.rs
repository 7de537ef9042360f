//! Job-application submission flow.
//!
//! Everything is validated up front, the five documents upload
//! concurrently, and the row is inserted only after all five landed.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng as _;
use townboard_core::{ApplicationId, Email};
use tracing::info;

use crate::backend::{ApplicationRecord, ApplicationStore, ObjectStore};
use crate::device::{AssetRef, AssetSource};
use crate::error::Result;

use super::{image_content_type, require, SubmissionError};

/// Application ids are `SE` plus a number in `BASE..BASE + SPREAD`.
const ID_BASE: u32 = 1611;
const ID_SPREAD: u32 = 1000;

/// The five required documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    pub passport_photo: Option<AssetRef>,
    pub national_id_doc: Option<AssetRef>,
    pub tax_id_doc: Option<AssetRef>,
    pub bank_doc: Option<AssetRef>,
    pub signature: Option<AssetRef>,
}

impl DocumentSet {
    /// All five documents, each paired with its storage field name.
    ///
    /// # Errors
    ///
    /// Names the first missing document.
    fn complete(&self) -> Result<[(&'static str, &AssetRef); 5], SubmissionError> {
        fn need<'a>(
            asset: &'a Option<AssetRef>,
            name: &'static str,
        ) -> Result<(&'static str, &'a AssetRef), SubmissionError> {
            match asset {
                Some(asset) => Ok((name, asset)),
                None => Err(SubmissionError::MissingDocument(name)),
            }
        }
        Ok([
            need(&self.passport_photo, "passport_photo")?,
            need(&self.national_id_doc, "national_id")?,
            need(&self.tax_id_doc, "tax_id")?,
            need(&self.bank_doc, "bank_proof")?,
            need(&self.signature, "signature")?,
        ])
    }
}

/// In-progress application form.
#[derive(Debug, Clone, Default)]
pub struct ApplicationForm {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub date_of_birth: String,
    pub national_id: String,
    pub tax_id: String,
    pub bank_details: String,
    pub terms_accepted: bool,
    pub documents: DocumentSet,
}

impl ApplicationForm {
    fn validate(&self) -> Result<Email, SubmissionError> {
        require(&self.full_name, "full_name")?;
        require(&self.phone, "phone")?;
        require(&self.date_of_birth, "date_of_birth")?;
        require(&self.national_id, "national_id")?;
        require(&self.tax_id, "tax_id")?;
        require(&self.bank_details, "bank_details")?;
        if !self.terms_accepted {
            return Err(SubmissionError::TermsNotAccepted);
        }
        Ok(Email::parse(self.email.trim())?)
    }
}

/// Runs the job-application submission.
pub struct ApplicationSubmitter {
    applications: Arc<dyn ApplicationStore>,
    storage: Arc<dyn ObjectStore>,
    assets: Arc<dyn AssetSource>,
    bucket: String,
}

impl ApplicationSubmitter {
    #[must_use]
    pub fn new(
        applications: Arc<dyn ApplicationStore>,
        storage: Arc<dyn ObjectStore>,
        assets: Arc<dyn AssetSource>,
        bucket: String,
    ) -> Self {
        Self {
            applications,
            storage,
            assets,
            bucket,
        }
    }

    /// Submit the application, returning its generated id.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmissionError`] for validation rejections before any
    /// upload, or the first upload/insert failure.
    pub async fn submit(&self, form: &ApplicationForm) -> Result<ApplicationId> {
        let email = form.validate()?;
        let documents = form.documents.complete()?;

        let id = Self::generate_id();
        let [passport, national, tax, bank, signature] = documents;
        let (passport_photo_url, national_id_doc_url, tax_id_doc_url, bank_doc_url, signature_url) =
            tokio::try_join!(
                self.upload_document(&id, passport),
                self.upload_document(&id, national),
                self.upload_document(&id, tax),
                self.upload_document(&id, bank),
                self.upload_document(&id, signature),
            )?;

        let record = ApplicationRecord {
            id: id.clone(),
            full_name: form.full_name.trim().to_string(),
            phone: form.phone.trim().to_string(),
            email: email.into_inner(),
            date_of_birth: form.date_of_birth.trim().to_string(),
            national_id: form.national_id.trim().to_string(),
            tax_id: form.tax_id.trim().to_string(),
            bank_details: form.bank_details.trim().to_string(),
            passport_photo_url,
            national_id_doc_url,
            tax_id_doc_url,
            bank_doc_url,
            signature_url,
            terms_accepted: form.terms_accepted,
            created_at: Utc::now(),
        };
        self.applications.insert_application(&record).await?;

        info!(id = %record.id, "job application submitted");
        Ok(id)
    }

    fn generate_id() -> ApplicationId {
        ApplicationId::from_number(ID_BASE + rand::rng().random_range(0..ID_SPREAD))
    }

    async fn upload_document(
        &self,
        id: &ApplicationId,
        (field, asset): (&'static str, &AssetRef),
    ) -> Result<String> {
        let loaded = self.assets.load(asset).await?;
        let extension = loaded.extension.unwrap_or_else(|| "jpg".to_string());
        let path = format!("{id}/{field}.{extension}");
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
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::backend::BackendError;
    use crate::device::{DeviceError, LoadedAsset};

    #[derive(Default)]
    struct RecordingBackend {
        uploads: Mutex<Vec<String>>,
        records: Mutex<Vec<ApplicationRecord>>,
        upload_count: AtomicUsize,
        fail_uploads: bool,
    }

    #[async_trait]
    impl ObjectStore for RecordingBackend {
        async fn upload(
            &self,
            _bucket: &str,
            path: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
            _upsert: bool,
        ) -> Result<(), BackendError> {
            self.upload_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_uploads {
                return Err(BackendError::Api {
                    status: 500,
                    message: "storage unavailable".to_string(),
                });
            }
            self.uploads.lock().unwrap().push(path.to_string());
            Ok(())
        }

        fn public_url(&self, bucket: &str, path: &str) -> String {
            format!("https://cdn.test/{bucket}/{path}")
        }
    }

    #[async_trait]
    impl ApplicationStore for RecordingBackend {
        async fn insert_application(&self, record: &ApplicationRecord) -> Result<(), BackendError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct StaticAssets;

    #[async_trait]
    impl AssetSource for StaticAssets {
        async fn load(&self, asset: &AssetRef) -> Result<LoadedAsset, DeviceError> {
            Ok(LoadedAsset {
                bytes: b"doc".to_vec(),
                extension: asset.extension(),
            })
        }
    }

    fn submitter(backend: Arc<RecordingBackend>) -> ApplicationSubmitter {
        ApplicationSubmitter::new(
            backend.clone(),
            backend,
            Arc::new(StaticAssets),
            "application-documents".to_string(),
        )
    }

    fn filled_form() -> ApplicationForm {
        let doc = |name: &str| Some(AssetRef::parse(&format!("/tmp/{name}.jpg")).unwrap());
        ApplicationForm {
            full_name: "A Person".to_string(),
            phone: "5550100".to_string(),
            email: "a@example.com".to_string(),
            date_of_birth: "01/02/1990".to_string(),
            national_id: "1234".to_string(),
            tax_id: "5678".to_string(),
            bank_details: "branch 9".to_string(),
            terms_accepted: true,
            documents: DocumentSet {
                passport_photo: doc("passport"),
                national_id_doc: doc("nid"),
                tax_id_doc: doc("tax"),
                bank_doc: doc("bank"),
                signature: doc("sig"),
            },
        }
    }

    #[tokio::test]
    async fn test_missing_document_fails_before_any_upload() {
        let backend = Arc::new(RecordingBackend::default());
        let submitter = submitter(backend.clone());

        let mut form = filled_form();
        form.documents.signature = None;

        let error = submitter.submit(&form).await.unwrap_err();
        assert!(error.to_string().contains("signature"));
        assert_eq!(backend.upload_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unaccepted_terms_fail_before_any_upload() {
        let backend = Arc::new(RecordingBackend::default());
        let submitter = submitter(backend.clone());

        let mut form = filled_form();
        form.terms_accepted = false;

        assert!(submitter.submit(&form).await.is_err());
        assert_eq!(backend.upload_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_uploads_five_documents_and_inserts_once() {
        let backend = Arc::new(RecordingBackend::default());
        let submitter = submitter(backend.clone());

        let id = submitter.submit(&filled_form()).await.unwrap();

        let uploads = backend.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 5);
        assert!(uploads.iter().all(|path| path.starts_with(id.as_str())));
        assert!(uploads.iter().any(|path| path.ends_with("signature.jpg")));

        let records = backend.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert!(records[0].passport_photo_url.contains("passport_photo"));
    }

    #[tokio::test]
    async fn test_upload_failure_aborts_before_insert() {
        let backend = Arc::new(RecordingBackend {
            fail_uploads: true,
            ..Default::default()
        });
        let submitter = submitter(backend.clone());

        assert!(submitter.submit(&filled_form()).await.is_err());
        assert!(backend.records.lock().unwrap().is_empty());
    }

    #[test]
    fn test_generated_ids_stay_in_band() {
        for _ in 0..50 {
            let id = ApplicationSubmitter::generate_id();
            let number: u32 = id.as_str()[2..].parse().unwrap();
            assert!((ID_BASE..ID_BASE + ID_SPREAD).contains(&number));
        }
    }
}
