//! Sign-in, sign-out, and identity commands.

use townboard_core::Email;
use townboard_directory::backend::OAuthProvider;

use crate::session_file::{self, StoredSession};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Sign in with email + password and persist the session.
pub async fn login(email: &str, password: &str) -> CommandResult {
    let email: Email = email.parse()?;
    let state = super::bootstrapped_state().await?;

    state.sessions().login(&email, password).await?;
    state.sessions().wait_settled().await;

    let session = state
        .sessions()
        .session()
        .ok_or("login accepted but no session arrived")?;
    session_file::save(
        &state.config().session_file,
        &StoredSession {
            refresh_token: session.refresh_token.clone(),
        },
    )?;

    print_signed_in(&session.user.email);
    Ok(())
}

/// Print the Google authorize URL for a browser-based sign-in.
pub async fn login_google() -> CommandResult {
    let state = super::bootstrapped_state().await?;
    let url = state.sessions().login_with_oauth(OAuthProvider::Google)?;
    print_authorize_url(url.as_str());
    Ok(())
}

/// Sign out and forget the persisted session.
pub async fn logout() -> CommandResult {
    let state = super::bootstrapped_state().await?;
    state.sessions().logout().await;
    state.sessions().wait_settled().await;
    session_file::clear(&state.config().session_file)?;
    print_signed_out();
    Ok(())
}

/// Show the signed-in account and its premium status.
pub async fn whoami() -> CommandResult {
    let state = super::bootstrapped_state().await?;
    match state.sessions().session() {
        Some(session) => {
            // Resolve the flag inline rather than racing the startup fetch.
            state.sessions().refresh_entitlement().await;
            print_identity(session.user.email.as_str(), state.entitlement().is_premium());
        }
        None => print_anonymous(),
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_signed_in(email: &Email) {
    println!("Signed in as {email}");
}

#[allow(clippy::print_stdout)]
fn print_authorize_url(url: &str) {
    println!("Open this URL in a browser to continue:");
    println!("{url}");
}

#[allow(clippy::print_stdout)]
fn print_signed_out() {
    println!("Signed out");
}

#[allow(clippy::print_stdout)]
fn print_identity(email: &str, premium: bool) {
    let tier = if premium { "premium" } else { "standard" };
    println!("{email} ({tier})");
}

#[allow(clippy::print_stdout)]
fn print_anonymous() {
    println!("Not signed in");
}
