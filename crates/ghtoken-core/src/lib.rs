//! Core pieces of GitHub App authentication: credential resolution and the
//! signed app assertion. Nothing in this crate touches the network.

pub mod assertion;
pub mod credentials;
pub mod error;

pub use assertion::{AppAssertion, AssertionClaims, ExpiryWindow};
pub use credentials::{resolve_credentials, AppCredentials, CredentialSource};
pub use error::{ErrorKind, Result, TokenError};
