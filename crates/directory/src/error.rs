//! Crate-level error type.

use crate::backend::BackendError;
use crate::config::ConfigError;
use crate::device::DeviceError;
use crate::submissions::SubmissionError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Anything the directory app surfaces to its caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("authentication failed: {0}")]
    Auth(#[source] BackendError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
