//! Error taxonomy shared by every stage of the token flow.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`TokenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    NotFound,
    Parse,
    Crypto,
    Network,
    Response,
}

/// Any failure while resolving credentials, signing, or talking to GitHub.
///
/// Every variant is fatal: the CLI reports it and exits non-zero.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Missing or invalid credential source, or a missing required field.
    #[error("{0}")]
    Config(String),

    /// The credential file does not exist.
    #[error("File {} not found", .path.display())]
    NotFound { path: PathBuf },

    /// A credential source held malformed JSON.
    #[error("Invalid JSON: {0}")]
    Parse(String),

    /// The private key could not be parsed or used for signing.
    #[error("Failed to sign app assertion: {0}")]
    Crypto(String),

    /// Transport failure or timeout.
    #[error("Request to GitHub failed: {0}")]
    Network(String),

    /// GitHub answered, but not with what we needed.
    #[error("Unexpected GitHub response: {0}")]
    Response(String),
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::Config(_) => ErrorKind::Config,
            TokenError::NotFound { .. } => ErrorKind::NotFound,
            TokenError::Parse(_) => ErrorKind::Parse,
            TokenError::Crypto(_) => ErrorKind::Crypto,
            TokenError::Network(_) => ErrorKind::Network,
            TokenError::Response(_) => ErrorKind::Response,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        TokenError::Crypto(err.to_string())
    }
}

pub type Result<T, E = TokenError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_path() {
        let err = TokenError::NotFound {
            path: PathBuf::from("/nonexistent"),
        };
        assert_eq!(err.to_string(), "File /nonexistent not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_jwt_error_maps_to_crypto() {
        let err: TokenError =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidKeyFormat)
                .into();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }
}
