pub(crate) mod lookup;
pub(crate) mod session;

use axum::routing::{get, post};

use crate::application::rate_limit::LookupRateLimitLayer;
use crate::application::state::AppState;

/// `parse` and `resolve` share the lookup budget with `POST /search`.
pub(super) fn router(lookup_limit: LookupRateLimitLayer) -> axum::Router<AppState> {
    let lookups = axum::Router::new()
        .route("/parse", post(lookup::parse))
        .route("/resolve", get(lookup::resolve))
        .layer(lookup_limit);

    axum::Router::new()
        .merge(lookups)
        .route("/session", get(session::get_session))
}
