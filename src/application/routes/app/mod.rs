mod viewer;

use axum::response::IntoResponse;
use axum::routing::{get, post};

use crate::application::rate_limit::LookupRateLimitLayer;
use crate::application::state::AppState;

/// Generate a static asset handler that serves an embedded file with cache headers.
macro_rules! static_asset_str {
    ($name:ident, $path:literal, $content_type:literal) => {
        async fn $name() -> impl IntoResponse {
            (
                [
                    ("content-type", $content_type),
                    ("cache-control", "public, max-age=604800"),
                ],
                include_str!($path),
            )
        }
    };
}

pub(super) fn router(lookup_limit: LookupRateLimitLayer) -> axum::Router<AppState> {
    let lookups = axum::Router::new()
        .route("/search", post(viewer::search))
        .layer(lookup_limit);

    axum::Router::new()
        .merge(lookups)
        .route("/", get(viewer::viewer_page))
        .route("/next", post(viewer::next_record))
        .route("/previous", post(viewer::previous_record))
        .route("/records/{index}", post(viewer::jump_to_record))
        .route("/records/{index}/mark", post(viewer::toggle_mark))
        .route("/clear", post(viewer::clear))
        .route("/image/failed", post(viewer::image_failed))
        .route("/image/loaded", post(viewer::image_loaded))
        .route("/static/css/styles.css", get(styles))
        .route("/health", get(health))
}

static_asset_str!(
    styles,
    "../../../../static/css/styles.css",
    "text/css; charset=utf-8"
);

async fn health() -> impl IntoResponse {
    ([("content-type", "application/json")], r#"{"status":"ok"}"#)
}
