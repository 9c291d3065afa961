use serde::Serialize;

use super::locator::{IMAGE_EXTENSIONS, ResourceLocator};

/// Progress of the image probe for the active record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "attempt", rename_all = "lowercase")]
pub enum ProbeState {
    Idle,
    Probing(usize),
    Resolved(usize),
    Exhausted,
}

impl ProbeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProbeState::Resolved(_) | ProbeState::Exhausted)
    }

    /// Index of the extension currently on screen, if any.
    pub fn attempt(self) -> Option<usize> {
        match self {
            ProbeState::Probing(i) | ProbeState::Resolved(i) => Some(i),
            ProbeState::Idle | ProbeState::Exhausted => None,
        }
    }
}

/// Advance past a failed candidate.
pub fn next_candidate(state: ProbeState, candidates: usize) -> ProbeState {
    match state {
        ProbeState::Idle if candidates == 0 => ProbeState::Exhausted,
        ProbeState::Idle => ProbeState::Probing(0),
        ProbeState::Probing(i) if i + 1 < candidates => ProbeState::Probing(i + 1),
        ProbeState::Probing(_) => ProbeState::Exhausted,
        terminal => terminal,
    }
}

/// Mark the current candidate as loaded.
pub fn resolve_candidate(state: ProbeState) -> ProbeState {
    match state {
        ProbeState::Probing(i) => ProbeState::Resolved(i),
        other => other,
    }
}

/// Extension-fallback probe for one guía.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    guia: String,
    state: ProbeState,
    extensions: &'static [&'static str],
}

impl Resolver {
    pub fn new(guia: impl Into<String>) -> Self {
        Self::with_extensions(guia, &IMAGE_EXTENSIONS)
    }

    pub fn with_extensions(guia: impl Into<String>, extensions: &'static [&'static str]) -> Self {
        Self {
            guia: guia.into(),
            state: ProbeState::Idle,
            extensions,
        }
    }

    /// Start probing from the first extension.
    pub fn arm(&mut self) {
        self.state = next_candidate(ProbeState::Idle, self.extensions.len());
    }

    /// Point the probe at a different guía and restart it.
    pub fn rearm(&mut self, guia: impl Into<String>) {
        self.guia = guia.into();
        self.arm();
    }

    pub fn fail(&mut self) {
        if let ProbeState::Probing(_) = self.state {
            self.state = next_candidate(self.state, self.extensions.len());
        }
    }

    pub fn succeed(&mut self) {
        self.state = resolve_candidate(self.state);
    }

    pub fn guia(&self) -> &str {
        &self.guia
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == ProbeState::Exhausted
    }

    pub fn candidate_count(&self) -> usize {
        self.extensions.len()
    }

    pub fn current_extension(&self) -> Option<&'static str> {
        self.state.attempt().and_then(|i| self.extensions.get(i).copied())
    }

    pub fn current_url(&self, locator: &ResourceLocator) -> Option<String> {
        self.current_extension()
            .map(|ext| locator.image_url(&self.guia, ext))
    }
}
