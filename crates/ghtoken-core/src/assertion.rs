//! Signed JWT assertion used to authenticate as the GitHub App itself.
//!
//! GitHub accepts an RS256 JWT with `iat`, `exp` and `iss` claims, valid for
//! at most ten minutes. `iat` is backdated to tolerate clock drift between
//! this machine and GitHub.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::credentials::AppCredentials;
use crate::error::{Result, TokenError};

/// Seconds `iat` is moved into the past.
pub const CLOCK_DRIFT_SECS: i64 = 60;
pub const DEFAULT_WINDOW_MINUTES: u32 = 10;
/// GitHub rejects assertions that live longer than this.
pub const MAX_WINDOW_MINUTES: u32 = 10;

/// Claims carried by the app assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// GitHub App identifier
    pub iss: String,
}

/// Validity window of an assertion, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow(u32);

impl ExpiryWindow {
    /// Zero is rejected; anything above the GitHub maximum is clamped.
    pub fn new(minutes: u32) -> Result<Self> {
        if minutes == 0 {
            return Err(TokenError::Config(
                "Assertion expiration must be at least 1 minute".to_string(),
            ));
        }
        if minutes > MAX_WINDOW_MINUTES {
            warn!(
                "Assertion expiration of {} minutes exceeds the GitHub maximum, using {}",
                minutes, MAX_WINDOW_MINUTES
            );
            return Ok(Self(MAX_WINDOW_MINUTES));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn seconds(self) -> i64 {
        i64::from(self.0) * 60
    }
}

impl Default for ExpiryWindow {
    fn default() -> Self {
        Self(DEFAULT_WINDOW_MINUTES)
    }
}

/// A signed, short-lived app assertion.
#[derive(Clone)]
pub struct AppAssertion {
    claims: AssertionClaims,
    token: String,
}

impl AppAssertion {
    /// Claims for an assertion issued at `now` (Unix seconds).
    pub fn claims_at(app_id: &str, window: ExpiryWindow, now: i64) -> AssertionClaims {
        AssertionClaims {
            iat: now - CLOCK_DRIFT_SECS,
            exp: now + window.seconds(),
            iss: app_id.to_string(),
        }
    }

    /// Sign a fresh assertion for the current time.
    pub fn sign(credentials: &AppCredentials, window: ExpiryWindow) -> Result<Self> {
        Self::sign_at(credentials, window, Utc::now().timestamp())
    }

    /// Sign an assertion as if the clock read `now`.
    pub fn sign_at(credentials: &AppCredentials, window: ExpiryWindow, now: i64) -> Result<Self> {
        let claims = Self::claims_at(&credentials.app_id, window, now);

        let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
            .map_err(|err| TokenError::Crypto(format!("invalid RSA private key: {}", err)))?;
        let token = encode(&Header::new(Algorithm::RS256), &claims, &key)?;

        debug!(
            app_id = %claims.iss,
            iat = claims.iat,
            exp = claims.exp,
            "Signed app assertion"
        );

        Ok(Self { claims, token })
    }

    pub fn claims(&self) -> &AssertionClaims {
        &self.claims
    }

    /// Compact JWT, ready for an `Authorization: Bearer` header.
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AppAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppAssertion")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    const PRIVATE_KEY: &str = include_str!("../../../testdata/app-private-key.pem");
    const PUBLIC_KEY: &str = include_str!("../../../testdata/app-public-key.pem");

    fn credentials() -> AppCredentials {
        AppCredentials::new("123", PRIVATE_KEY).unwrap()
    }

    #[test]
    fn test_default_window_spans_660_seconds() {
        let claims = AppAssertion::claims_at("123", ExpiryWindow::default(), 1_700_000_000);
        assert_eq!(claims.iat, 1_700_000_000 - 60);
        assert_eq!(claims.exp, 1_700_000_000 + 600);
        assert_eq!(claims.exp - claims.iat, 660);
        assert_eq!(claims.iss, "123");
    }

    #[test]
    fn test_window_span_for_every_allowed_window() {
        for minutes in 1..=MAX_WINDOW_MINUTES {
            let window = ExpiryWindow::new(minutes).unwrap();
            let claims = AppAssertion::claims_at("42", window, 1_000);
            assert_eq!(claims.exp - claims.iat, i64::from(minutes) * 60 + 60);
        }
    }

    #[test]
    fn test_window_bounds() {
        assert_eq!(
            ExpiryWindow::new(0).unwrap_err().kind(),
            ErrorKind::Config
        );
        assert_eq!(ExpiryWindow::new(30).unwrap().minutes(), MAX_WINDOW_MINUTES);
        assert_eq!(ExpiryWindow::new(5).unwrap().minutes(), 5);
    }

    #[test]
    fn test_signed_assertion_verifies_with_public_key() {
        let now = Utc::now().timestamp();
        let assertion = AppAssertion::sign_at(&credentials(), ExpiryWindow::default(), now)
            .expect("signing should succeed");

        // Should have 3 parts separated by dots
        assert_eq!(assertion.as_str().split('.').count(), 3);

        let header = decode_header(assertion.as_str()).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iat", "iss"]);
        validation.set_issuer(&["123"]);

        let decoded = decode::<AssertionClaims>(
            assertion.as_str(),
            &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .expect("Failed to decode assertion");

        assert_eq!(&decoded.claims, assertion.claims());
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 660);
    }

    #[test]
    fn test_malformed_key_is_crypto_error() {
        let creds = AppCredentials::new("123", "not a pem").unwrap();
        let err = AppAssertion::sign(&creds, ExpiryWindow::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn test_debug_hides_token() {
        let assertion = AppAssertion::sign(&credentials(), ExpiryWindow::default()).unwrap();
        let rendered = format!("{:?}", assertion);
        assert!(!rendered.contains(assertion.as_str()));
    }
}
