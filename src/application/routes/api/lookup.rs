use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;

use crate::application::errors::{ApiError, AppError};
use crate::application::services::{LookupPlan, Resolution, plan_lookup, resolve_image};
use crate::application::state::AppState;
use crate::domain::guia;

#[derive(Debug, Deserialize)]
pub(crate) struct ParseRequest {
    input: String,
}

#[tracing::instrument(skip(state, request))]
pub(crate) async fn parse(
    State(state): State<AppState>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<LookupPlan>, ApiError> {
    let plan = plan_lookup(&request.input, &state.locator)?;
    info!(records = plan.records.len(), mode = ?plan.mode, "parsed lookup");
    Ok(Json(plan))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveQuery {
    guia: String,
}

#[tracing::instrument(skip(state))]
pub(crate) async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<Resolution>, ApiError> {
    let token = query.guia.trim();
    if token.is_empty() {
        return Err(AppError::validation("guia must not be empty").into());
    }

    let guia = guia::normalize(token);
    let resolution = resolve_image(state.image_source.as_ref(), &state.locator, &guia).await;
    Ok(Json(resolution))
}
