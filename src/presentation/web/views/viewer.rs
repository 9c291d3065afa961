use crate::domain::input::InputRecord;
use crate::domain::locator::ResourceLocator;
use crate::domain::resolver::ProbeState;
use crate::domain::viewer::Viewer;

/// Everything the viewer page needs, pre-formatted for the template.
pub struct ViewerPageView {
    pub error: Option<String>,
    pub result: Option<ResultView>,
}

pub struct ResultView {
    pub record_index: usize,
    pub ssc: String,
    pub guia: String,
    pub pdf_url: String,
    pub image: ImageView,
    pub bulk: bool,
    /// 1-based "n / total" label.
    pub position: String,
    pub has_previous: bool,
    pub has_next: bool,
    pub marked_count: usize,
    pub rows: Vec<RecordRowView>,
}

pub struct ImageView {
    /// URL to put in the `<img>`; absent once every extension failed.
    pub url: Option<String>,
    /// True while the browser should still report load/error events.
    pub probing: bool,
    pub attempt: usize,
    pub attempt_label: String,
}

pub struct RecordRowView {
    pub index: usize,
    pub number: usize,
    pub ssc: String,
    pub guia: String,
    pub marked: bool,
    pub active: bool,
}

impl ViewerPageView {
    pub fn from_domain(viewer: &Viewer, locator: &ResourceLocator) -> Self {
        Self {
            error: viewer.error().map(|err| err.to_string()),
            result: ResultView::from_domain(viewer, locator),
        }
    }
}

impl ResultView {
    fn from_domain(viewer: &Viewer, locator: &ResourceLocator) -> Option<Self> {
        let record = viewer.current()?;
        let record_index = viewer.current_index()?;
        let resolver = viewer.resolver()?;
        let state = resolver.state();
        let total = viewer.records().len();

        let image = ImageView {
            url: resolver.current_url(locator),
            probing: matches!(state, ProbeState::Probing(_)),
            attempt: state.attempt().unwrap_or_default(),
            attempt_label: attempt_label(state, resolver.candidate_count()),
        };

        let rows = viewer
            .records()
            .iter()
            .enumerate()
            .map(|(index, row)| RecordRowView::new(index, row, index == record_index))
            .collect();

        Some(Self {
            record_index,
            ssc: record.ssc.clone(),
            guia: record.guia.clone(),
            pdf_url: locator.pdf_url(&record.ssc),
            image,
            bulk: viewer.is_bulk(),
            position: format!("{} / {total}", record_index + 1),
            has_previous: viewer.has_previous(),
            has_next: viewer.has_next(),
            marked_count: viewer.marked_indices().len(),
            rows,
        })
    }
}

impl RecordRowView {
    fn new(index: usize, record: &InputRecord, active: bool) -> Self {
        Self {
            index,
            number: index + 1,
            ssc: record.ssc.clone(),
            guia: record.guia.clone(),
            marked: record.marked,
            active,
        }
    }
}

fn attempt_label(state: ProbeState, candidates: usize) -> String {
    match state {
        ProbeState::Probing(i) => format!("Probando formato {} de {candidates}", i + 1),
        ProbeState::Resolved(_) => "Imagen encontrada".to_string(),
        ProbeState::Exhausted => "No se encontró la imagen en ningún formato".to_string(),
        ProbeState::Idle => String::new(),
    }
}
