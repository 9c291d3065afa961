use std::sync::Arc;
use std::time::Duration;

use crate::domain::locator::ResourceLocator;
use crate::domain::repositories::ViewerSessionRepository;
use crate::infrastructure::image_source::{HttpImageSource, ImageSource};
use crate::infrastructure::repositories::sessions::InMemorySessionRepository;

/// Everything that varies between production and test environments.
pub struct AppStateConfig {
    pub locator: ResourceLocator,
    pub insecure_cookies: bool,
    pub probe_timeout: Duration,
    /// Viewer sessions kept before the least recently seen one is evicted.
    pub max_sessions: usize,
    /// Per-client budget shared by search, parse and resolve.
    pub lookups_per_minute: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub locator: Arc<ResourceLocator>,
    pub session_repo: Arc<dyn ViewerSessionRepository>,
    pub image_source: Arc<dyn ImageSource>,
    pub insecure_cookies: bool,
    pub lookups_per_minute: u32,
}

impl AppState {
    /// Build the application state with an empty in-memory session store.
    pub fn new(config: AppStateConfig) -> Self {
        #[allow(clippy::expect_used)] // Startup: no TLS backend means nothing can work
        let image_source: Arc<dyn ImageSource> = Arc::new(
            HttpImageSource::with_timeout(config.probe_timeout)
                .expect("failed to build HTTP client"),
        );
        let session_repo: Arc<dyn ViewerSessionRepository> =
            Arc::new(InMemorySessionRepository::with_capacity(config.max_sessions));

        Self {
            locator: Arc::new(config.locator),
            session_repo,
            image_source,
            insecure_cookies: config.insecure_cookies,
            lookups_per_minute: config.lookups_per_minute,
        }
    }
}
