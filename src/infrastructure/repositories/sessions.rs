use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use crate::domain::RepositoryError;
use crate::domain::repositories::ViewerSessionRepository;
use crate::domain::sessions::{SessionId, ViewerSession};
use crate::domain::viewer::{Viewer, ViewerEvent};

pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Process-local session store. Sessions vanish on restart.
///
/// Holds at most `capacity` sessions; opening one more evicts the session
/// that was touched least recently.
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<SessionId, ViewerSession>>,
    capacity: usize,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, ViewerSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }
}

fn evict_least_recent(sessions: &mut HashMap<SessionId, ViewerSession>) {
    let oldest = sessions
        .values()
        .min_by_key(|session| session.last_seen)
        .map(|session| session.id);

    if let Some(id) = oldest {
        sessions.remove(&id);
        warn!(session = %id, "session store full; evicted least recently used session");
    }
}

#[async_trait]
impl ViewerSessionRepository for InMemorySessionRepository {
    async fn get(&self, id: SessionId) -> Result<Viewer, RepositoryError> {
        self.lock()
            .get(&id)
            .map(|session| session.viewer.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn apply(&self, id: SessionId, event: ViewerEvent) -> Result<Viewer, RepositoryError> {
        let now = Utc::now();
        let mut sessions = self.lock();
        if !sessions.contains_key(&id) && sessions.len() >= self.capacity {
            evict_least_recent(&mut sessions);
        }

        let session = sessions
            .entry(id)
            .or_insert_with(|| ViewerSession::new(id, now));

        session.viewer.apply(event);
        session.last_seen = now;
        Ok(session.viewer.clone())
    }

    async fn delete_older_than(&self, max_idle: Duration) -> Result<u64, RepositoryError> {
        let max_idle = chrono::Duration::from_std(max_idle)
            .map_err(|err| RepositoryError::unexpected(format!("invalid idle window: {err}")))?;
        let cutoff = Utc::now() - max_idle;

        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen >= cutoff);
        Ok((before - sessions.len()) as u64)
    }
}
