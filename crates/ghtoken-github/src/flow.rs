//! Assertion -> installation lookup -> token exchange.

use ghtoken_core::{AppAssertion, AppCredentials, ExpiryWindow, Result};
use tracing::debug;

use crate::client::GitHubAppClient;
use crate::responses::InstallationToken;

/// Issue an installation access token for the app behind `credentials`.
///
/// Each step runs once; the first failure ends the flow.
pub fn issue_installation_token(
    client: &GitHubAppClient,
    credentials: &AppCredentials,
    window: ExpiryWindow,
) -> Result<InstallationToken> {
    let assertion = AppAssertion::sign(credentials, window)?;

    let installation_id = client.installation_id(&assertion)?;
    debug!(installation_id = %installation_id, "Resolved installation");

    let token = client.installation_token(&installation_id, &assertion)?;
    match token.expires_at.as_deref() {
        Some(expires_at) => debug!("Issued installation token, expires at {}", expires_at),
        None => debug!("Issued installation token"),
    }

    Ok(token)
}
