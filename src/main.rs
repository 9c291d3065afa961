use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use visor::application::{ServerConfig, serve};
use visor::presentation::cli::{Cli, Commands, ServeCommand, lookup};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::Parse(cmd) => lookup::parse(cmd),
        Commands::Urls(cmd) => lookup::urls(cmd),
        Commands::Resolve(cmd) => lookup::resolve(cmd).await,
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    if command.insecure_cookies {
        tracing::warn!(
            "insecure cookies enabled for development/demo setup - do not use in production"
        );
    }

    let config = ServerConfig {
        bind_address: command.bind_address,
        locator: command.locator.locator()?,
        insecure_cookies: command.insecure_cookies,
        probe_timeout: command.probe.timeout(),
        max_sessions: command.max_sessions,
        lookups_per_minute: command.lookups_per_minute,
    };

    serve(config).await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    // Logs go to stderr so CLI output on stdout stays valid JSON.
    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}
