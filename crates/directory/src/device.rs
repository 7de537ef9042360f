//! Device-side capabilities the submission flows consume.
//!
//! Pickers hand back either a filesystem path or an inline base64 data
//! URI; [`AssetRef`] normalizes both so the flows treat them uniformly.
//! Location is behind [`Locator`] because a fix may legitimately be
//! unavailable (permission denied, no provider) and listings still submit
//! without one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use townboard_core::Coordinates;

/// Failures reading device-local assets or the location fix.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("failed to read asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data URI (expected `data:<type>;base64,<payload>`)")]
    MalformedDataUri,

    #[error("invalid base64 payload in data URI: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("location fix unavailable: {0}")]
    Location(String),
}

/// A picked asset, before its bytes are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// An inline `data:<media type>;base64,<payload>` URI.
    DataUri { media_type: String, payload: String },
}

impl AssetRef {
    /// Classify a picker result string.
    ///
    /// # Errors
    ///
    /// Returns an error for a `data:` URI without a base64 payload.
    pub fn parse(input: &str) -> Result<Self, DeviceError> {
        let Some(rest) = input.strip_prefix("data:") else {
            return Ok(Self::Path(PathBuf::from(input)));
        };
        let (media_type, payload) = rest
            .split_once(";base64,")
            .ok_or(DeviceError::MalformedDataUri)?;
        Ok(Self::DataUri {
            media_type: media_type.to_string(),
            payload: payload.to_string(),
        })
    }

    /// Lower-cased file extension hint, when one can be derived.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        match self {
            Self::Path(path) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase),
            Self::DataUri { media_type, .. } => media_type
                .split_once('/')
                .map(|(_, subtype)| subtype.to_ascii_lowercase()),
        }
    }
}

impl From<&Path> for AssetRef {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// An asset with its bytes in memory, ready to upload.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub bytes: Vec<u8>,
    pub extension: Option<String>,
}

/// Resolves asset references to bytes.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Load the asset's bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when the asset cannot be read or decoded.
    async fn load(&self, asset: &AssetRef) -> Result<LoadedAsset, DeviceError>;
}

/// Asset source backed by the local filesystem.
///
/// Data URIs decode inline without touching the disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAssetSource;

#[async_trait]
impl AssetSource for FsAssetSource {
    async fn load(&self, asset: &AssetRef) -> Result<LoadedAsset, DeviceError> {
        let extension = asset.extension();
        let bytes = match asset {
            AssetRef::Path(path) => {
                tokio::fs::read(path).await.map_err(|source| DeviceError::Read {
                    path: path.clone(),
                    source,
                })?
            }
            AssetRef::DataUri { payload, .. } => BASE64.decode(payload)?,
        };
        Ok(LoadedAsset { bytes, extension })
    }
}

/// A resolved location fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub coordinates: Coordinates,
}

/// Provides the device's current location, when one is available.
#[async_trait]
pub trait Locator: Send + Sync {
    /// The current fix, or `None` when the device cannot provide one.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider fails outright, as opposed to
    /// declining to produce a fix.
    async fn current_fix(&self) -> Result<Option<LocationFix>, DeviceError>;
}

/// Locator returning a preconfigured fix (or none).
///
/// Used by the CLI, where coordinates come from flags, and by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocator {
    fix: Option<LocationFix>,
}

impl FixedLocator {
    #[must_use]
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self {
            fix: coordinates.map(|coordinates| LocationFix { coordinates }),
        }
    }
}

#[async_trait]
impl Locator for FixedLocator {
    async fn current_fix(&self) -> Result<Option<LocationFix>, DeviceError> {
        Ok(self.fix)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_path() {
        let asset = AssetRef::parse("/tmp/photos/storefront.PNG").unwrap();
        assert_eq!(asset, AssetRef::Path(PathBuf::from("/tmp/photos/storefront.PNG")));
        assert_eq!(asset.extension().as_deref(), Some("png"));
    }

    #[test]
    fn test_parse_data_uri() {
        let asset = AssetRef::parse("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(asset.extension().as_deref(), Some("jpeg"));
    }

    #[test]
    fn test_parse_rejects_non_base64_data_uri() {
        let error = AssetRef::parse("data:image/jpeg,rawpayload").unwrap_err();
        assert!(matches!(error, DeviceError::MalformedDataUri));
    }

    #[test]
    fn test_extension_missing_when_path_has_none() {
        let asset = AssetRef::parse("/tmp/photos/storefront").unwrap();
        assert_eq!(asset.extension(), None);
    }

    #[tokio::test]
    async fn test_data_uri_decodes_without_disk_access() {
        let asset = AssetRef::parse("data:image/png;base64,aGVsbG8=").unwrap();
        let loaded = FsAssetSource.load(&asset).await.unwrap();
        assert_eq!(loaded.bytes, b"hello");
        assert_eq!(loaded.extension.as_deref(), Some("png"));
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let asset = AssetRef::parse("/nonexistent/asset.jpg").unwrap();
        let error = FsAssetSource.load(&asset).await.unwrap_err();
        assert!(error.to_string().contains("/nonexistent/asset.jpg"));
    }

    #[tokio::test]
    async fn test_fixed_locator_round_trip() {
        let coordinates = Coordinates::new(41.0, 20.0).unwrap();
        let locator = FixedLocator::new(Some(coordinates));
        let fix = locator.current_fix().await.unwrap().unwrap();
        assert_eq!(fix.coordinates, coordinates);

        assert!(FixedLocator::default().current_fix().await.unwrap().is_none());
    }
}
