//! Parsing of GitHub App API response bodies.

use std::fmt;

use ghtoken_core::{Result, TokenError};
use serde::Deserialize;
use serde_json::Value;

/// Identifier of an App installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationId(String);

impl InstallationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Installation access token returned by the exchange endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct InstallationToken {
    pub token: String,
    pub expires_at: Option<String>,
}

impl fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Id of the first installation in a `GET /app/installations` body.
///
/// Apps installed on several accounts get the first entry; there is no
/// tie-break.
pub fn parse_installation_id(body: &str) -> Result<InstallationId> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| TokenError::Response(format!("installations body is not JSON: {}", err)))?;

    let installations = value.as_array().ok_or_else(|| {
        TokenError::Response("installations body is not a JSON array".to_string())
    })?;
    let first = installations.first().ok_or_else(|| {
        TokenError::Response("GitHub App has no installations".to_string())
    })?;

    match first.get("id") {
        Some(Value::Number(n)) if n.is_u64() || n.is_i64() => Ok(InstallationId(n.to_string())),
        Some(Value::String(s)) if !s.is_empty() => Ok(InstallationId(s.clone())),
        Some(_) => Err(TokenError::Response(
            "installation 'id' is not an integer or string".to_string(),
        )),
        None => Err(TokenError::Response(
            "installation entry is missing 'id'".to_string(),
        )),
    }
}

/// Token from a `POST /app/installations/{id}/access_tokens` body.
pub fn parse_access_token(body: &str) -> Result<InstallationToken> {
    let payload: AccessTokenResponse = serde_json::from_str(body).map_err(|err| {
        TokenError::Response(format!("access token body is not valid JSON: {}", err))
    })?;

    match payload.token {
        Some(token) if !token.is_empty() => Ok(InstallationToken {
            token,
            expires_at: payload.expires_at,
        }),
        _ => Err(TokenError::Response(
            "access token response is missing 'token'".to_string(),
        )),
    }
}

/// GitHub's `message` field from an error body, if there is one.
pub fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|err| err.message)
}
