//! Submission flows: business listings and job applications.
//!
//! Both flows validate fully before touching the network, upload assets
//! to the hosted object store, then persist a single row. An upload that
//! succeeded before a later failure is left behind; rows are only written
//! after every upload landed, so readers never see a half-assembled
//! record.

mod application;
mod business;

pub use application::{ApplicationForm, ApplicationSubmitter, DocumentSet};
pub use business::{BusinessForm, BusinessSubmitter, IMAGE_SLOTS};

use townboard_core::EmailError;

/// Rejections raised before a submission performs any I/O.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("business submission requires a premium account")]
    PremiumRequired,

    #[error("required field missing: {0}")]
    MissingField(&'static str),

    #[error("at least one image is required")]
    NoImages,

    #[error("required document missing: {0}")]
    MissingDocument(&'static str),

    #[error("terms and conditions must be accepted")]
    TermsNotAccepted,

    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Content type for an uploaded image by file extension.
///
/// The store serves objects with whatever type they were uploaded under,
/// so `jpg` must map to the registered `image/jpeg`.
pub(crate) fn image_content_type(extension: &str) -> String {
    let subtype = if extension == "jpg" { "jpeg" } else { extension };
    format!("image/{subtype}")
}

pub(crate) fn video_content_type(extension: &str) -> String {
    format!("video/{extension}")
}

/// Reject empty or whitespace-only required fields.
fn require(value: &str, field: &'static str) -> Result<(), SubmissionError> {
    if value.trim().is_empty() {
        return Err(SubmissionError::MissingField(field));
    }
    Ok(())
}
