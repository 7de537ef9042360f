//! Clients for the hosted backend services.
//!
//! # Architecture
//!
//! - The backend is source of truth - no local sync, direct API calls
//! - Three REST surfaces share one project URL and API key:
//!   - auth: password grant, token refresh, OAuth authorize, sign-out
//!   - data: filtered row selects, inserts, named-parameter RPC
//!   - storage: bucket uploads and public URL derivation
//! - Consumers depend on the traits in [`traits`], not the concrete
//!   clients, so tests can substitute in-memory services
//!
//! # Example
//!
//! ```rust,ignore
//! use townboard_directory::backend::{AuthClient, RestClient};
//!
//! let auth = AuthClient::new(&config.backend);
//! let session = auth.sign_in_with_password(&email, "password").await?;
//!
//! let rest = RestClient::new(&config.backend);
//! let listings = rest.fetch_listings().await?;
//! ```

mod auth;
mod rest;
mod storage;
pub mod traits;
pub mod types;

pub use auth::AuthClient;
pub use rest::RestClient;
pub use storage::StorageClient;
pub use traits::{ApplicationStore, AuthApi, ListingStore, ObjectStore, ProfileReader};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL construction failed.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Maximum error-body length carried into an [`BackendError::Api`] message.
const ERROR_SNIPPET_LEN: usize = 200;

/// Build an [`BackendError::Api`] from a response body.
///
/// The services use a handful of error envelopes (`error_description`,
/// `msg`, `message`); this picks the first usable one and otherwise carries
/// a truncated body snippet.
pub(crate) fn api_error(status: reqwest::StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_owned))
        })
        .unwrap_or_else(|| body.chars().take(ERROR_SNIPPET_LEN).collect());

    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_prefers_error_description() {
        let err = api_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(
            err.to_string(),
            "API error (400): Invalid login credentials"
        );
    }

    #[test]
    fn test_api_error_falls_back_to_msg() {
        let err = api_error(reqwest::StatusCode::FORBIDDEN, r#"{"msg":"denied"}"#);
        assert_eq!(err.to_string(), "API error (403): denied");
    }

    #[test]
    fn test_api_error_carries_body_snippet() {
        let err = api_error(reqwest::StatusCode::BAD_GATEWAY, "upstream exploded");
        assert_eq!(err.to_string(), "API error (502): upstream exploded");
    }

    #[test]
    fn test_api_error_truncates_long_bodies() {
        let body = "x".repeat(500);
        let err = api_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        let BackendError::Api { message, .. } = err else {
            panic!("expected Api variant");
        };
        assert_eq!(message.len(), ERROR_SNIPPET_LEN);
    }
}
