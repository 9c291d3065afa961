use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::viewer::Viewer;

/// Opaque identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A viewer together with the last time its owner touched it.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    pub id: SessionId,
    pub viewer: Viewer,
    pub last_seen: DateTime<Utc>,
}

impl ViewerSession {
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            viewer: Viewer::default(),
            last_seen: now,
        }
    }
}
