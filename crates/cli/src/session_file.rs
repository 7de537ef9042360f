//! Persisted session state.
//!
//! Only the refresh token is written to disk; access tokens are minted
//! fresh on every startup via the refresh grant.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub refresh_token: String,
}

/// Load the persisted session, if a readable one exists.
///
/// A missing or unparsable file reads as "no session"; startup then
/// resolves to signed-out rather than failing.
pub fn load(path: &Path) -> Option<StoredSession> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "ignoring corrupt session file");
            None
        }
    }
}

/// Persist the session for the next invocation.
pub fn save(path: &Path, session: &StoredSession) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(session).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// Forget the persisted session. Missing files are fine.
pub fn clear(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(error) if error.kind() != std::io::ErrorKind::NotFound => Err(error),
        _ => Ok(()),
    }
}
