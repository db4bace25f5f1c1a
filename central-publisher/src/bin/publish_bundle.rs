//! Upload a finished publication bundle to the Central Portal.
//!
//! Credentials come from a `local.properties`-style file
//! (`sonatypeUser` / `sonatypePassword` keys) or from the `SONATYPE_USER` /
//! `SONATYPE_TOKEN` environment variables. Any failure, including a non-201
//! answer from the portal, exits non-zero so the surrounding pipeline halts.
//!
//! Run with `publish-bundle build/publication.zip --credentials-file local.properties`.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context};
use central_publisher::{Credentials, PublisherClient, UploadRequest};
use clap::Parser;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the zipped publication bundle
    bundle: PathBuf,

    /// Properties file holding `sonatypeUser` and `sonatypePassword`
    #[arg(long)]
    credentials_file: Option<PathBuf>,

    /// Central Portal account id
    #[arg(long, env = "SONATYPE_USER", hide_env_values = true)]
    user: Option<String>,

    /// Central Portal account token
    #[arg(long, env = "SONATYPE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Override the publisher endpoint (e.g. a local mock for dry runs)
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .init();

    let cli = Cli::parse();
    let credentials = resolve_credentials(&cli)?;

    let mut builder = PublisherClient::builder();
    if let Some(endpoint) = &cli.endpoint {
        builder.endpoint(endpoint);
    }
    let client = builder.build()?;

    let request = UploadRequest::new(&cli.bundle, credentials);
    let receipt = client.upload(&request).await?;
    info!(
        "{} accepted by the publisher ({})",
        cli.bundle.display(),
        receipt.status
    );
    Ok(())
}

/// A credentials file wins over environment variables, matching the original
/// `local.properties` workflow.
fn resolve_credentials(cli: &Cli) -> anyhow::Result<Credentials> {
    if let Some(path) = &cli.credentials_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading credentials file {}", path.display()))?;
        let properties = parse_properties(&raw);
        let user = properties
            .get("sonatypeUser")
            .with_context(|| format!("no sonatypeUser in {}", path.display()))?;
        let token = properties
            .get("sonatypePassword")
            .with_context(|| format!("no sonatypePassword in {}", path.display()))?;
        return Ok(Credentials::new(user.clone(), token.clone()));
    }

    match (&cli.user, &cli.token) {
        (Some(user), Some(token)) => Ok(Credentials::new(user.clone(), token.clone())),
        _ => bail!(
            "no credentials: pass --credentials-file or set SONATYPE_USER and SONATYPE_TOKEN"
        ),
    }
}

/// Minimal java-properties parsing: `key=value` lines, `#`/`!` comments.
fn parse_properties(raw: &str) -> HashMap<String, String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect()
}
