//! Blocking HTTP client for the GitHub App endpoints.

use std::time::Duration;

use ghtoken_core::{AppAssertion, Result, TokenError};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::responses::{
    parse_access_token, parse_error_message, parse_installation_id, InstallationId,
    InstallationToken,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("github-app-token/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the GitHub App installation API.
pub struct GitHubAppClient {
    client: Client,
    api_base: String,
}

impl GitHubAppClient {
    /// Create a client for the given REST API base
    /// (e.g. "https://api.github.com" or a GitHub Enterprise "https://host/api/v3").
    pub fn new(api_base: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| TokenError::Network(format!("failed to build HTTP client: {}", err)))?;

        let api_base = api_base.into().trim_end_matches('/').to_string();
        debug!("Creating GitHubAppClient with API base: {}", api_base);

        Ok(Self { client, api_base })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Look up the installation id of the app the assertion was signed for.
    pub fn installation_id(&self, assertion: &AppAssertion) -> Result<InstallationId> {
        let url = format!("{}/app/installations", self.api_base);
        debug!("GET {}", url);

        let body = self.execute(self.client.get(&url), assertion, "installation lookup")?;
        parse_installation_id(&body)
    }

    /// Exchange the assertion for an installation access token.
    pub fn installation_token(
        &self,
        installation_id: &InstallationId,
        assertion: &AppAssertion,
    ) -> Result<InstallationToken> {
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_base, installation_id
        );
        debug!("POST {}", url);

        let body = self.execute(self.client.post(&url), assertion, "token exchange")?;
        parse_access_token(&body)
    }

    fn execute(
        &self,
        request: RequestBuilder,
        assertion: &AppAssertion,
        action: &str,
    ) -> Result<String> {
        let response = request
            .header(ACCEPT, GITHUB_ACCEPT)
            .bearer_auth(assertion.as_str())
            .send()
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().map_err(network_error)?;
        debug!(%status, "GitHub {} responded", action);

        if !status.is_success() {
            let detail = parse_error_message(&body).unwrap_or_else(|| body.trim().to_string());
            return Err(TokenError::Response(format!(
                "{} returned {}: {}",
                action, status, detail
            )));
        }

        Ok(body)
    }
}

fn network_error(err: reqwest::Error) -> TokenError {
    if err.is_timeout() {
        TokenError::Network(format!(
            "request timed out after {}s",
            REQUEST_TIMEOUT.as_secs()
        ))
    } else if err.is_connect() {
        TokenError::Network(format!("connection failed: {}", err))
    } else {
        TokenError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = GitHubAppClient::new("https://ghe.example.com/api/v3/").unwrap();
        assert_eq!(client.api_base(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_user_agent_names_tool() {
        assert!(USER_AGENT.starts_with("github-app-token/"));
    }
}
