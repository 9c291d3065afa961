use std::time::Duration;

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::sessions::SessionId;
use crate::domain::viewer::{Viewer, ViewerEvent};

#[async_trait]
pub trait ViewerSessionRepository: Send + Sync {
    /// Current viewer for a session, or `NotFound` if it never existed or expired.
    async fn get(&self, id: SessionId) -> Result<Viewer, RepositoryError>;

    /// Apply one event atomically, creating the session if needed, and return
    /// the resulting viewer.
    async fn apply(&self, id: SessionId, event: ViewerEvent) -> Result<Viewer, RepositoryError>;

    /// Drop sessions idle for longer than `max_idle`, returning how many went.
    async fn delete_older_than(&self, max_idle: Duration) -> Result<u64, RepositoryError>;
}
