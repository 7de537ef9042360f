//! Command implementations.

pub mod auth;
pub mod directory;
pub mod submit;

use townboard_directory::config::TownboardConfig;
use townboard_directory::AppState;

use crate::session_file;

/// Build the app state and resolve the persisted session.
pub(crate) async fn bootstrapped_state() -> Result<AppState, Box<dyn std::error::Error>> {
    let config = TownboardConfig::from_env()?;
    let state = AppState::new(config);
    bootstrap(&state).await;
    Ok(state)
}

pub(crate) async fn bootstrap(state: &AppState) {
    let stored = session_file::load(&state.config().session_file);
    state
        .sessions()
        .bootstrap(stored.as_ref().map(|s| s.refresh_token.as_str()))
        .await;
    state.sessions().wait_settled().await;
}
