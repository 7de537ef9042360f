//! Submission commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use townboard_core::Coordinates;
use townboard_directory::config::TownboardConfig;
use townboard_directory::device::{AssetRef, FixedLocator, FsAssetSource};
use townboard_directory::submissions::{ApplicationForm, BusinessForm, DocumentSet, IMAGE_SLOTS};
use townboard_directory::AppState;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Args)]
pub struct BusinessArgs {
    /// Business name
    #[arg(long)]
    pub name: String,

    /// Directory category
    #[arg(long)]
    pub category: String,

    /// Owner's display name
    #[arg(long, default_value = "")]
    pub owner_name: String,

    /// Contact phone number
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Free-form description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Sales reference id
    #[arg(long, default_value = "")]
    pub reference_id: String,

    /// Street address
    #[arg(long, default_value = "")]
    pub address: String,

    /// Working hours, free-form
    #[arg(long, default_value = "")]
    pub working_hours: String,

    /// The business delivers to customers
    #[arg(long)]
    pub home_delivery: bool,

    /// Image file (repeatable, up to 7)
    #[arg(long = "image", num_args = 1)]
    pub images: Vec<PathBuf>,

    /// Optional video file
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Latitude of the business (requires --longitude)
    #[arg(long, requires = "longitude")]
    pub latitude: Option<f64>,

    /// Longitude of the business (requires --latitude)
    #[arg(long, requires = "latitude")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Args)]
pub struct ApplicationArgs {
    /// Applicant's full name
    #[arg(long)]
    pub full_name: String,

    /// Contact phone number
    #[arg(long)]
    pub phone: String,

    /// Contact email address
    #[arg(long)]
    pub email: String,

    /// Date of birth
    #[arg(long)]
    pub date_of_birth: String,

    /// National id number
    #[arg(long)]
    pub national_id: String,

    /// Tax id number
    #[arg(long)]
    pub tax_id: String,

    /// Bank account details
    #[arg(long)]
    pub bank_details: String,

    /// Accept the terms and conditions
    #[arg(long)]
    pub accept_terms: bool,

    /// Passport photo file
    #[arg(long)]
    pub passport_photo: PathBuf,

    /// National id document file
    #[arg(long)]
    pub national_id_doc: PathBuf,

    /// Tax id document file
    #[arg(long)]
    pub tax_id_doc: PathBuf,

    /// Bank proof document file
    #[arg(long)]
    pub bank_doc: PathBuf,

    /// Signature image file
    #[arg(long)]
    pub signature: PathBuf,
}

/// Submit a business listing as the signed-in account.
pub async fn business(args: BusinessArgs) -> CommandResult {
    if args.images.len() > IMAGE_SLOTS {
        return Err(format!("at most {IMAGE_SLOTS} images are supported").into());
    }

    let coordinates = match (args.latitude, args.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)?),
        _ => None,
    };

    let config = TownboardConfig::from_env()?;
    let state = AppState::with_device(
        config,
        Arc::new(FsAssetSource),
        Arc::new(FixedLocator::new(coordinates)),
    );
    super::bootstrap(&state).await;

    let mut form = BusinessForm {
        name: args.name,
        category: args.category,
        owner_name: args.owner_name,
        phone: args.phone,
        description: args.description,
        reference_id: args.reference_id,
        address: args.address,
        working_hours: args.working_hours,
        supports_home_delivery: args.home_delivery,
        ..BusinessForm::default()
    };
    for (slot, path) in form.images.iter_mut().zip(&args.images) {
        *slot = Some(asset(path)?);
    }
    form.video = args.video.as_deref().map(asset).transpose()?;

    let owner = state.sessions().current_user();
    // The startup premium fetch runs in the background; resolve it
    // before the gate reads the flag.
    state.sessions().refresh_entitlement().await;
    state.businesses().submit(&mut form, owner).await?;

    print_business_accepted();
    Ok(())
}

/// Submit a job application.
pub async fn application(args: ApplicationArgs) -> CommandResult {
    let state = super::bootstrapped_state().await?;

    let form = ApplicationForm {
        full_name: args.full_name,
        phone: args.phone,
        email: args.email,
        date_of_birth: args.date_of_birth,
        national_id: args.national_id,
        tax_id: args.tax_id,
        bank_details: args.bank_details,
        terms_accepted: args.accept_terms,
        documents: DocumentSet {
            passport_photo: Some(asset(&args.passport_photo)?),
            national_id_doc: Some(asset(&args.national_id_doc)?),
            tax_id_doc: Some(asset(&args.tax_id_doc)?),
            bank_doc: Some(asset(&args.bank_doc)?),
            signature: Some(asset(&args.signature)?),
        },
    };

    let id = state.applications().submit(&form).await?;
    print_application_accepted(id.as_str());
    Ok(())
}

fn asset(path: &Path) -> Result<AssetRef, Box<dyn std::error::Error>> {
    Ok(AssetRef::parse(&path.display().to_string())?)
}

#[allow(clippy::print_stdout)]
fn print_business_accepted() {
    println!("Business listing submitted");
}

#[allow(clippy::print_stdout)]
fn print_application_accepted(id: &str) {
    println!("Application submitted: {id}");
}
