use axum::Json;
use axum::extract::State;
use tower_cookies::Cookies;

use crate::application::errors::ApiError;
use crate::application::session::load_viewer;
use crate::application::state::AppState;
use crate::domain::viewer::ViewerSnapshot;

/// Snapshot of the caller's viewer; an empty one when there is no session yet.
#[tracing::instrument(skip(state, cookies))]
pub(crate) async fn get_session(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<ViewerSnapshot>, ApiError> {
    let viewer = load_viewer(&state, &cookies).await?;

    Ok(Json(viewer.snapshot(&state.locator)))
}
