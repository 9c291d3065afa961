use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

/// Default per-request budget for one image candidate.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadOutcome {
    Loaded,
    Failed,
}

/// Something that can tell whether an image URL loads: the server-side
/// stand-in for a browser's `<img>` load and error events.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn load(&self, url: &str) -> LoadOutcome;
}

/// Probes candidates with plain `GET` requests.
///
/// A 2xx response with a non-empty body counts as loaded. Transport errors,
/// timeouts, other statuses and empty bodies all count as failures.
#[derive(Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpImageSource {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Source backed by a fresh client identifying itself as visor.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(concat!("visor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(client, timeout))
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn load(&self, url: &str) -> LoadOutcome {
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(r) => r,
            Err(err) => {
                warn!(url, error = %err, "image request failed");
                return LoadOutcome::Failed;
            }
        };

        if !response.status().is_success() {
            debug!(url, status = %response.status(), "image candidate not available");
            return LoadOutcome::Failed;
        }

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(err) => {
                warn!(url, error = %err, "failed to read image bytes");
                return LoadOutcome::Failed;
            }
        };

        if bytes.is_empty() {
            warn!(url, "image candidate returned empty body");
            return LoadOutcome::Failed;
        }

        debug!(url, bytes = bytes.len(), "image candidate loaded");
        LoadOutcome::Loaded
    }
}
