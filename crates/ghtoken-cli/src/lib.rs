//! github-app-token - print an installation access token for a GitHub App.
//!
//! Credentials come from exactly one source: an environment variable, a
//! file, an inline JSON string, or explicit `--private-key`/`--app-id` flags.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ghtoken_core::{resolve_credentials, CredentialSource, ExpiryWindow};
use ghtoken_github::{issue_installation_token, GitHubAppClient, DEFAULT_API_URL};
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Print a GitHub App installation access token
#[derive(Parser, Debug)]
#[command(name = "github-app-token", author, version, about)]
pub struct Args {
    #[command(flatten)]
    pub source: SourceArgs,

    /// GitHub App private key (with --direct)
    #[arg(short = 'p', long, value_name = "KEY", allow_hyphen_values = true)]
    pub private_key: Option<String>,

    /// GitHub App ID (with --direct)
    #[arg(short = 'a', long, value_name = "ID")]
    pub app_id: Option<String>,

    /// App assertion lifetime in minutes (GitHub allows at most 10)
    #[arg(long, value_name = "MINUTES", default_value_t = 10)]
    pub expiration: u32,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Log request steps to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Credential source; exactly one must be given.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Name of environment variable with JSON secrets
    #[arg(short, long, value_name = "NAME")]
    pub env: Option<String>,

    /// Path to file with JSON secrets
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Inline JSON secrets
    #[arg(short, long, value_name = "JSON")]
    pub inline: Option<String>,

    /// Direct secrets (--private-key and --app-id)
    #[arg(short, long)]
    pub direct: bool,
}

impl Args {
    pub fn credential_source(&self) -> CredentialSource {
        if !self.source.direct && (self.private_key.is_some() || self.app_id.is_some()) {
            warn!("--private-key and --app-id are only used with --direct; ignoring them");
        }

        if let Some(name) = &self.source.env {
            CredentialSource::Env(name.clone())
        } else if let Some(path) = &self.source.file {
            CredentialSource::File(path.clone())
        } else if let Some(json) = &self.source.inline {
            CredentialSource::Inline(json.clone())
        } else {
            CredentialSource::Direct {
                private_key: self.private_key.clone(),
                app_id: self.app_id.clone(),
            }
        }
    }
}

/// Resolve credentials and fetch the installation token.
pub fn run<F>(args: &Args, env: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = resolve_credentials(&args.credential_source(), env)?;
    let window = ExpiryWindow::new(args.expiration)?;
    let client = GitHubAppClient::new(args.api_url.as_str())?;

    let token = issue_installation_token(&client, &credentials, window)?;
    Ok(token.token)
}

/// Logs go to stderr; stdout carries only the token.
pub fn init_tracing(verbose: bool) -> Result<()> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    if verbose {
        filter = filter
            .add_directive("ghtoken_core=debug".parse()?)
            .add_directive("ghtoken_github=debug".parse()?)
            .add_directive("ghtoken_cli=debug".parse()?);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}
