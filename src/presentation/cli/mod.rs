pub mod lookup;

use std::io::Read;
use std::net::SocketAddr;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::application::rate_limit::DEFAULT_LOOKUPS_PER_MINUTE;
use crate::domain::locator::{DEFAULT_BUCKET_BASE, DEFAULT_PDF_ENDPOINT, ResourceLocator};
use crate::infrastructure::image_source::DEFAULT_PROBE_TIMEOUT;
use crate::infrastructure::repositories::sessions::DEFAULT_MAX_SESSIONS;
use lookup::{ParseCommand, ResolveCommand, UrlsCommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Look up SSC documents and dispatch guide scans", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Parse lookup input and print the records as JSON
    Parse(ParseCommand),

    /// Print the PDF URL and every image candidate for one record
    Urls(UrlsCommand),

    /// Probe each record's image over HTTP and print the results
    Resolve(ResolveCommand),
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(long, env = "VISOR_BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,

    #[command(flatten)]
    pub locator: LocatorArgs,

    #[arg(long, env = "VISOR_INSECURE_COOKIES")]
    pub insecure_cookies: bool,

    #[command(flatten)]
    pub probe: ProbeArgs,

    /// Viewer sessions kept in memory before the least recently seen is evicted
    #[arg(long, env = "VISOR_MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    pub max_sessions: usize,

    /// Searches, parses and resolves allowed per client address each minute
    #[arg(long, env = "VISOR_LOOKUPS_PER_MINUTE", default_value_t = DEFAULT_LOOKUPS_PER_MINUTE)]
    pub lookups_per_minute: u32,
}

/// Backend bases shared by every subcommand that builds URLs.
#[derive(Debug, Args)]
pub struct LocatorArgs {
    /// Object-storage prefix for guía images
    #[arg(long, env = "VISOR_BUCKET_BASE", default_value = DEFAULT_BUCKET_BASE)]
    pub bucket_base: String,

    /// PDF reprint endpoint for SSC documents
    #[arg(long, env = "VISOR_PDF_ENDPOINT", default_value = DEFAULT_PDF_ENDPOINT)]
    pub pdf_endpoint: String,
}

impl LocatorArgs {
    pub fn locator(&self) -> anyhow::Result<ResourceLocator> {
        ResourceLocator::new(&self.bucket_base, &self.pdf_endpoint)
            .context("invalid backend configuration")
    }
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Seconds to wait for each image candidate
    #[arg(long, env = "VISOR_PROBE_TIMEOUT_SECS", default_value_t = DEFAULT_PROBE_TIMEOUT.as_secs())]
    pub probe_timeout_secs: u64,
}

impl ProbeArgs {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.probe_timeout_secs)
    }
}

/// The positional input, or all of stdin when it was omitted.
///
/// Trailing line breaks from stdin are dropped so a piped single record is
/// not mistaken for bulk input.
pub(crate) fn read_input(input: Option<String>) -> anyhow::Result<String> {
    if let Some(input) = input {
        return Ok(input);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read input from stdin")?;
    Ok(buffer.trim_end_matches(['\n', '\r']).to_string())
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
