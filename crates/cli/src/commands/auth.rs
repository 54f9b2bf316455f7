//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! jx auth register -u ada -e ada@farm.ng -p secret
//! jx auth login -u ada -p secret
//! jx auth whoami
//! jx auth logout
//! ```

use jhytermax_core::{Email, Role};
use jhytermax_storefront::AppState;
use jhytermax_storefront::session::Registration;
use secrecy::SecretString;

use super::CommandResult;

/// Sign in and report who is now signed in.
pub async fn login(state: &AppState, username: &str, password: SecretString) -> CommandResult {
    let session = state.session();
    session.sign_in(username, &password).await?;
    let profile = session.ensure_profile().await?;
    tracing::info!(
        "Signed in as {} ({}{})",
        profile.username,
        profile.role,
        if profile.is_admin() { ", admin access" } else { "" }
    );
    Ok(())
}

/// Create an account and sign straight in.
pub async fn register(
    state: &AppState,
    username: String,
    email: &str,
    password: SecretString,
    role: Role,
) -> CommandResult {
    let registration = Registration {
        username,
        email: Email::parse(email)?,
        password,
        role,
    };
    state.session().sign_up(&registration).await?;
    tracing::info!(
        "Account {} created and signed in",
        registration.username
    );
    Ok(())
}

pub fn logout(state: &AppState) -> CommandResult {
    state.session().logout()?;
    tracing::info!("Signed out");
    Ok(())
}

pub async fn whoami(state: &AppState) -> CommandResult {
    let profile = state.session().ensure_profile().await?;
    tracing::info!(
        "#{} {} <{}> role={} admin={}",
        profile.id,
        profile.username,
        profile.email,
        profile.role,
        profile.is_admin()
    );
    Ok(())
}
