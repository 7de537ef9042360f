//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TOWNBOARD_BACKEND_URL` - Base URL of the hosted backend project
//! - `TOWNBOARD_ANON_KEY` - Publishable API key for the backend
//!
//! ## Optional
//! - `TOWNBOARD_BUSINESS_BUCKET` - Listing media bucket (default: `business-uploads`)
//! - `TOWNBOARD_DOCUMENTS_BUCKET` - Application documents bucket (default: `application-documents`)
//! - `TOWNBOARD_OAUTH_REDIRECT` - Redirect URL for OAuth sign-in completion
//! - `TOWNBOARD_SESSION_FILE` - Path for the persisted session (default: `.townboard-session.json`)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_KEY_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure key in {0}: {1}")]
    InsecureKey(String, String),
}

/// Townboard application configuration.
#[derive(Debug, Clone)]
pub struct TownboardConfig {
    /// Hosted backend configuration.
    pub backend: BackendConfig,
    /// Path where the CLI persists the session between runs.
    pub session_file: PathBuf,
}

/// Hosted backend (auth + data + storage) configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the backend project (e.g. `https://abc.example.co`).
    pub project_url: Url,
    /// Publishable API key sent with every request.
    pub anon_key: SecretString,
    /// Bucket for business listing images and videos.
    pub business_bucket: String,
    /// Bucket for job-application documents.
    pub documents_bucket: String,
    /// Redirect URL appended to OAuth authorize links.
    pub oauth_redirect: Option<String>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("project_url", &self.project_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("business_bucket", &self.business_bucket)
            .field("documents_bucket", &self.documents_bucket)
            .field("oauth_redirect", &self.oauth_redirect)
            .finish()
    }
}

impl TownboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the API key fails placeholder/length validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = BackendConfig::from_env()?;
        let session_file = get_env_or_default("TOWNBOARD_SESSION_FILE", ".townboard-session.json");

        Ok(Self {
            backend,
            session_file: PathBuf::from(session_file),
        })
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let project_url = get_required_env("TOWNBOARD_BACKEND_URL")?;
        let project_url = Url::parse(&project_url).map_err(|e| {
            ConfigError::InvalidEnvVar("TOWNBOARD_BACKEND_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            project_url,
            anon_key: get_validated_key("TOWNBOARD_ANON_KEY")?,
            business_bucket: get_env_or_default("TOWNBOARD_BUSINESS_BUCKET", "business-uploads"),
            documents_bucket: get_env_or_default(
                "TOWNBOARD_DOCUMENTS_BUCKET",
                "application-documents",
            ),
            oauth_redirect: get_optional_env("TOWNBOARD_OAUTH_REDIRECT"),
        })
    }

    /// The project URL without a trailing slash, for endpoint formatting.
    #[must_use]
    pub fn base(&self) -> &str {
        self.project_url.as_str().trim_end_matches('/')
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that an API key is not a pasted placeholder.
fn validate_key_strength(key: &str, var_name: &str) -> Result<(), ConfigError> {
    if key.len() < MIN_KEY_LENGTH {
        return Err(ConfigError::InsecureKey(
            var_name.to_string(),
            format!(
                "must be at least {MIN_KEY_LENGTH} characters (got {})",
                key.len()
            ),
        ));
    }

    let lower = key.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureKey(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate an API key from environment.
fn get_validated_key(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_key_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_backend_config() -> BackendConfig {
        BackendConfig {
            project_url: Url::parse("https://abc.backend.test/").unwrap(),
            anon_key: SecretString::from("k".repeat(48)),
            business_bucket: "business-uploads".to_string(),
            documents_bucket: "application-documents".to_string(),
            oauth_redirect: None,
        }
    }

    #[test]
    fn test_validate_key_placeholder() {
        let result = validate_key_strength(&format!("your-key-{}", "x".repeat(32)), "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureKey(_, _))));
    }

    #[test]
    fn test_validate_key_too_short() {
        let result = validate_key_strength("short", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureKey(_, _))));
    }

    #[test]
    fn test_validate_key_valid() {
        let key = "eyJhbGciOiJIUzI1NiJ9.fixture-token-body.sig";
        assert!(validate_key_strength(key, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_base_strips_trailing_slash() {
        let config = test_backend_config();
        assert_eq!(config.base(), "https://abc.backend.test");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = test_backend_config();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("kkkk"));
    }
}
