use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::routes::app_router;
use crate::application::state::{AppState, AppStateConfig};
use crate::domain::locator::ResourceLocator;
use crate::domain::repositories::ViewerSessionRepository;

/// How long a viewer session may sit idle before it is discarded.
const SESSION_MAX_IDLE: Duration = Duration::from_secs(24 * 3600);

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub locator: ResourceLocator,
    pub insecure_cookies: bool,
    pub probe_timeout: Duration,
    pub max_sessions: usize,
    pub lookups_per_minute: u32,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let bucket_base = config.locator.bucket_base().to_string();
    let pdf_endpoint = config.locator.pdf_endpoint().to_string();

    let state = AppState::new(AppStateConfig {
        locator: config.locator,
        insecure_cookies: config.insecure_cookies,
        probe_timeout: config.probe_timeout,
        max_sessions: config.max_sessions,
        lookups_per_minute: config.lookups_per_minute,
    });

    tokio::spawn(session_cleanup_task(
        Arc::clone(&state.session_repo),
        SESSION_SWEEP_INTERVAL,
        SESSION_MAX_IDLE,
    ));

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        bucket = %bucket_base,
        pdf_endpoint = %pdf_endpoint,
        max_sessions = config.max_sessions,
        lookups_per_minute = config.lookups_per_minute,
        "starting HTTP server"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

/// Periodically purge viewer sessions nobody has touched for `max_idle`.
pub async fn session_cleanup_task(
    session_repo: Arc<dyn ViewerSessionRepository>,
    every: Duration,
    max_idle: Duration,
) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        match session_repo.delete_older_than(max_idle).await {
            Ok(count) if count > 0 => {
                info!(count, "cleaned up idle viewer sessions");
            }
            Err(err) => {
                tracing::warn!(error = %err, "viewer session cleanup failed");
            }
            _ => {}
        }
    }
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
