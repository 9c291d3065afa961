use serde::{Deserialize, Serialize};

use super::input::{FormatError, InputRecord, parse_input};
use super::locator::{IMAGE_EXTENSIONS, ResourceLocator};
use super::resolver::{ProbeState, Resolver};

/// Everything a user (or the rendering surface) can do to a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ViewerEvent {
    Search { input: String },
    Next,
    Previous,
    JumpTo { index: usize },
    ToggleMark { index: usize },
    Clear,
    /// The image for `record` at extension `attempt` failed to load.
    ImageFailed { record: usize, attempt: usize },
    ImageLoaded { record: usize, attempt: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ViewerState {
    Empty { error: Option<FormatError> },
    Showing(Showing),
}

/// `records` is never empty and `current` always indexes into it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Showing {
    records: Vec<InputRecord>,
    current: usize,
    bulk: bool,
    resolver: Resolver,
}

impl Showing {
    fn activate(&mut self, index: usize) {
        self.current = index;
        self.resolver.rearm(self.records[index].guia.clone());
    }
}

/// One browser session's worth of lookup state: the parsed records, which
/// one is on screen, and how far its image probe has got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    state: ViewerState,
    extensions: &'static [&'static str],
}

impl Default for Viewer {
    fn default() -> Self {
        Self::with_extensions(&IMAGE_EXTENSIONS)
    }
}

impl Viewer {
    pub fn with_extensions(extensions: &'static [&'static str]) -> Self {
        Self {
            state: ViewerState::Empty { error: None },
            extensions,
        }
    }

    pub fn apply(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::Search { input } => {
                let _ = self.search(&input);
            }
            ViewerEvent::Next => self.next(),
            ViewerEvent::Previous => self.previous(),
            ViewerEvent::JumpTo { index } => self.jump_to(index),
            ViewerEvent::ToggleMark { index } => self.toggle_mark(index),
            ViewerEvent::Clear => self.clear(),
            ViewerEvent::ImageFailed { record, attempt } => self.image_failed(record, attempt),
            ViewerEvent::ImageLoaded { record, attempt } => self.image_loaded(record, attempt),
        }
    }

    /// Replace whatever is shown with the result of parsing `raw`.
    ///
    /// Prior records are discarded even when parsing fails; the error is kept
    /// for display until the next search or clear.
    pub fn search(&mut self, raw: &str) -> Result<(), FormatError> {
        match parse_input(raw) {
            Ok(query) => {
                let bulk = query.is_bulk();
                let records = query.into_records();
                let mut resolver =
                    Resolver::with_extensions(records[0].guia.clone(), self.extensions);
                resolver.arm();
                self.state = ViewerState::Showing(Showing {
                    records,
                    current: 0,
                    bulk,
                    resolver,
                });
                Ok(())
            }
            Err(err) => {
                self.state = ViewerState::Empty { error: Some(err) };
                Err(err)
            }
        }
    }

    pub fn next(&mut self) {
        if let ViewerState::Showing(showing) = &mut self.state
            && showing.current + 1 < showing.records.len()
        {
            let index = showing.current + 1;
            showing.activate(index);
        }
    }

    pub fn previous(&mut self) {
        if let ViewerState::Showing(showing) = &mut self.state
            && showing.current > 0
        {
            let index = showing.current - 1;
            showing.activate(index);
        }
    }

    pub fn jump_to(&mut self, index: usize) {
        if let ViewerState::Showing(showing) = &mut self.state
            && index < showing.records.len()
        {
            showing.activate(index);
        }
    }

    pub fn toggle_mark(&mut self, index: usize) {
        if let ViewerState::Showing(showing) = &mut self.state
            && let Some(record) = showing.records.get_mut(index)
        {
            record.marked = !record.marked;
        }
    }

    pub fn clear(&mut self) {
        self.state = ViewerState::Empty { error: None };
    }

    /// Failure signal for the image on screen. Signals for a record or
    /// extension that is no longer live are ignored.
    pub fn image_failed(&mut self, record: usize, attempt: usize) {
        if let Some(showing) = self.live_probe(record, attempt) {
            showing.resolver.fail();
        }
    }

    pub fn image_loaded(&mut self, record: usize, attempt: usize) {
        if let Some(showing) = self.live_probe(record, attempt) {
            showing.resolver.succeed();
        }
    }

    fn live_probe(&mut self, record: usize, attempt: usize) -> Option<&mut Showing> {
        match &mut self.state {
            ViewerState::Showing(showing)
                if showing.current == record
                    && showing.resolver.state() == ProbeState::Probing(attempt) =>
            {
                Some(showing)
            }
            _ => None,
        }
    }

    pub fn error(&self) -> Option<FormatError> {
        match &self.state {
            ViewerState::Empty { error } => *error,
            ViewerState::Showing(_) => None,
        }
    }

    pub fn is_showing(&self) -> bool {
        matches!(self.state, ViewerState::Showing(_))
    }

    pub fn is_bulk(&self) -> bool {
        matches!(&self.state, ViewerState::Showing(showing) if showing.bulk)
    }

    pub fn records(&self) -> &[InputRecord] {
        match &self.state {
            ViewerState::Showing(showing) => &showing.records,
            ViewerState::Empty { .. } => &[],
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            ViewerState::Showing(showing) => Some(showing.current),
            ViewerState::Empty { .. } => None,
        }
    }

    pub fn current(&self) -> Option<&InputRecord> {
        match &self.state {
            ViewerState::Showing(showing) => showing.records.get(showing.current),
            ViewerState::Empty { .. } => None,
        }
    }

    pub fn resolver(&self) -> Option<&Resolver> {
        match &self.state {
            ViewerState::Showing(showing) => Some(&showing.resolver),
            ViewerState::Empty { .. } => None,
        }
    }

    pub fn has_next(&self) -> bool {
        matches!(&self.state, ViewerState::Showing(s) if s.current + 1 < s.records.len())
    }

    pub fn has_previous(&self) -> bool {
        matches!(&self.state, ViewerState::Showing(s) if s.current > 0)
    }

    /// Indices of the records flagged for triage, in input order.
    pub fn marked_indices(&self) -> Vec<usize> {
        self.records()
            .iter()
            .enumerate()
            .filter(|(_, record)| record.marked)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn snapshot(&self, locator: &ResourceLocator) -> ViewerSnapshot {
        let current = self.current().map(|record| CurrentRecord {
            index: self.current_index().unwrap_or_default(),
            ssc: record.ssc.clone(),
            guia: record.guia.clone(),
            pdf_url: locator.pdf_url(&record.ssc),
            image_url: self.resolver().and_then(|r| r.current_url(locator)),
            probe: self.resolver().map_or(ProbeState::Idle, Resolver::state),
        });

        ViewerSnapshot {
            bulk: self.is_bulk(),
            error: self.error().map(|err| err.to_string()),
            total: self.records().len(),
            marked: self.marked_indices(),
            records: self.records().to_vec(),
            current,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewerSnapshot {
    pub bulk: bool,
    pub error: Option<String>,
    pub total: usize,
    pub marked: Vec<usize>,
    pub records: Vec<InputRecord>,
    pub current: Option<CurrentRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentRecord {
    pub index: usize,
    pub ssc: String,
    pub guia: String,
    pub pdf_url: String,
    pub image_url: Option<String>,
    pub probe: ProbeState,
}
