//! GitHub REST client for turning an app assertion into an installation
//! access token.

pub mod client;
pub mod flow;
pub mod responses;

pub use client::{GitHubAppClient, DEFAULT_API_URL, GITHUB_ACCEPT, REQUEST_TIMEOUT};
pub use flow::issue_installation_token;
pub use responses::{InstallationId, InstallationToken};
