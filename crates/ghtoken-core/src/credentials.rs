//! GitHub App credentials and the sources they can be loaded from.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, TokenError};

/// JSON key holding the GitHub App identifier.
pub const APP_ID_KEY: &str = "DEPLOYER_GITHUB_APP_ID";
/// JSON key holding the PEM-encoded private key.
pub const PRIVATE_KEY_KEY: &str = "PRIVATE_KEY";

/// App identifier plus RSA private key (PEM).
#[derive(Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub app_id: String,
    pub private_key: String,
}

impl AppCredentials {
    /// Build credentials, rejecting empty fields.
    pub fn new(app_id: impl Into<String>, private_key: impl Into<String>) -> Result<Self> {
        let app_id = app_id.into();
        let private_key = private_key.into();

        if private_key.trim().is_empty() {
            return Err(TokenError::Config(format!("{} is empty", PRIVATE_KEY_KEY)));
        }
        if app_id.trim().is_empty() {
            return Err(TokenError::Config(format!("{} is empty", APP_ID_KEY)));
        }

        Ok(Self {
            app_id,
            private_key,
        })
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Where the credentials for this run come from. Exactly one is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Name of an environment variable holding the secrets JSON.
    Env(String),
    /// Path to a file holding the secrets JSON.
    File(PathBuf),
    /// The secrets JSON itself.
    Inline(String),
    /// Explicit flags, no JSON involved.
    Direct {
        private_key: Option<String>,
        app_id: Option<String>,
    },
}

impl CredentialSource {
    fn describe(&self) -> &'static str {
        match self {
            CredentialSource::Env(_) => "environment variable",
            CredentialSource::File(_) => "file",
            CredentialSource::Inline(_) => "inline JSON",
            CredentialSource::Direct { .. } => "direct flags",
        }
    }
}

/// Resolve credentials from the selected source.
///
/// `env` looks up environment variables; pass `|name| std::env::var(name).ok()`
/// in production and a fixed map in tests.
pub fn resolve_credentials<F>(source: &CredentialSource, env: F) -> Result<AppCredentials>
where
    F: Fn(&str) -> Option<String>,
{
    debug!("Resolving GitHub App credentials from {}", source.describe());

    let secrets = match source {
        CredentialSource::Env(name) => {
            let raw = env(name)
                .ok_or_else(|| TokenError::Config(format!("{} is not set", name)))?;
            parse_secrets(&raw)?
        }
        CredentialSource::File(path) => {
            let raw = std::fs::read_to_string(path).map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => TokenError::NotFound { path: path.clone() },
                _ => TokenError::Config(format!("Failed to read {}: {}", path.display(), err)),
            })?;
            parse_secrets(&raw)?
        }
        CredentialSource::Inline(raw) => parse_secrets(raw)?,
        CredentialSource::Direct {
            private_key,
            app_id,
        } => {
            return match (private_key, app_id) {
                (Some(private_key), Some(app_id)) => {
                    AppCredentials::new(app_id.clone(), private_key.clone())
                }
                _ => Err(TokenError::Config(
                    "--direct option requires --private-key and --app-id".to_string(),
                )),
            };
        }
    };

    let app_id = app_id_field(&secrets)?;
    let private_key = private_key_field(&secrets)?;
    AppCredentials::new(app_id, private_key)
}

fn parse_secrets(raw: &str) -> Result<Map<String, Value>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| TokenError::Parse(err.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(TokenError::Config(
            "Secrets JSON must be an object".to_string(),
        )),
    }
}

fn required<'a>(secrets: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    secrets.get(key).ok_or_else(|| {
        TokenError::Config(format!(
            "Secrets JSON is missing '{}' key. Make sure you have set {} and {}.",
            key, APP_ID_KEY, PRIVATE_KEY_KEY
        ))
    })
}

fn app_id_field(secrets: &Map<String, Value>) -> Result<String> {
    match required(secrets, APP_ID_KEY)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        _ => Err(TokenError::Config(format!(
            "{} must be a string or an integer",
            APP_ID_KEY
        ))),
    }
}

fn private_key_field(secrets: &Map<String, Value>) -> Result<String> {
    match required(secrets, PRIVATE_KEY_KEY)? {
        Value::String(s) => Ok(s.clone()),
        _ => Err(TokenError::Config(format!(
            "{} must be a string",
            PRIVATE_KEY_KEY
        ))),
    }
}
