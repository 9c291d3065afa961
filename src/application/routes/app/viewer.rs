use axum::Form;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::{debug, info};

use crate::application::errors::{AppError, map_app_error};
use crate::application::routes::render_html;
use crate::application::session::{ViewerSessionId, load_viewer};
use crate::application::state::AppState;
use crate::domain::sessions::SessionId;
use crate::domain::viewer::{Viewer, ViewerEvent};
use crate::presentation::web::templates::ViewerTemplate;
use crate::presentation::web::views::ViewerPageView;

const INPUT_PLACEHOLDER: &str = "Ej: 3394535 335-17-20-CC-3589";

#[tracing::instrument(skip(state, cookies))]
pub(crate) async fn viewer_page(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Html<String>, StatusCode> {
    let viewer = load_viewer(&state, &cookies)
        .await
        .map_err(|err| map_app_error(err.into()))?;

    let template = ViewerTemplate {
        version_info: &crate::VERSION_INFO,
        input_placeholder: INPUT_PLACEHOLDER,
        view: ViewerPageView::from_domain(&viewer, &state.locator),
    };

    render_html(template)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchForm {
    input: String,
}

#[tracing::instrument(skip(state, form))]
pub(crate) async fn search(
    State(state): State<AppState>,
    ViewerSessionId(id): ViewerSessionId,
    Form(form): Form<SearchForm>,
) -> Result<Redirect, StatusCode> {
    let viewer = apply(&state, id, ViewerEvent::Search { input: form.input }).await?;

    match viewer.error() {
        Some(err) => info!(error = %err, "search rejected"),
        None => info!(
            records = viewer.records().len(),
            bulk = viewer.is_bulk(),
            "search accepted"
        ),
    }

    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn next_record(
    State(state): State<AppState>,
    ViewerSessionId(id): ViewerSessionId,
) -> Result<Redirect, StatusCode> {
    apply(&state, id, ViewerEvent::Next).await?;
    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn previous_record(
    State(state): State<AppState>,
    ViewerSessionId(id): ViewerSessionId,
) -> Result<Redirect, StatusCode> {
    apply(&state, id, ViewerEvent::Previous).await?;
    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn jump_to_record(
    State(state): State<AppState>,
    ViewerSessionId(id): ViewerSessionId,
    Path(index): Path<usize>,
) -> Result<Redirect, StatusCode> {
    apply(&state, id, ViewerEvent::JumpTo { index }).await?;
    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn toggle_mark(
    State(state): State<AppState>,
    ViewerSessionId(id): ViewerSessionId,
    Path(index): Path<usize>,
) -> Result<Redirect, StatusCode> {
    apply(&state, id, ViewerEvent::ToggleMark { index }).await?;
    Ok(Redirect::to("/"))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn clear(
    State(state): State<AppState>,
    ViewerSessionId(id): ViewerSessionId,
) -> Result<Redirect, StatusCode> {
    apply(&state, id, ViewerEvent::Clear).await?;
    Ok(Redirect::to("/"))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageSignalForm {
    record: usize,
    attempt: usize,
}

/// `<img onerror>` lands here; the redirect brings up the next candidate.
#[tracing::instrument(skip(state))]
pub(crate) async fn image_failed(
    State(state): State<AppState>,
    ViewerSessionId(id): ViewerSessionId,
    Form(signal): Form<ImageSignalForm>,
) -> Result<Redirect, StatusCode> {
    let viewer = apply(
        &state,
        id,
        ViewerEvent::ImageFailed {
            record: signal.record,
            attempt: signal.attempt,
        },
    )
    .await?;

    if let Some(resolver) = viewer.resolver() {
        debug!(state = ?resolver.state(), guia = resolver.guia(), "image probe advanced");
    }

    Ok(Redirect::to("/"))
}

/// Sent in the background from `<img onload>`, so no redirect.
#[tracing::instrument(skip(state))]
pub(crate) async fn image_loaded(
    State(state): State<AppState>,
    ViewerSessionId(id): ViewerSessionId,
    Form(signal): Form<ImageSignalForm>,
) -> Result<StatusCode, StatusCode> {
    apply(
        &state,
        id,
        ViewerEvent::ImageLoaded {
            record: signal.record,
            attempt: signal.attempt,
        },
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn apply(state: &AppState, id: SessionId, event: ViewerEvent) -> Result<Viewer, StatusCode> {
    state
        .session_repo
        .apply(id, event)
        .await
        .map_err(|err| map_app_error(AppError::from(err)))
}
