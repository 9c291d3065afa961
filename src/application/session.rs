use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::{Span, debug};

use crate::application::state::AppState;
use crate::domain::RepositoryError;
use crate::domain::sessions::SessionId;
use crate::domain::viewer::Viewer;

pub const SESSION_COOKIE_NAME: &str = "visor_session";

/// Session id from the request cookie, if present and well-formed.
pub fn session_id(cookies: &Cookies) -> Option<SessionId> {
    let cookie = cookies.get(SESSION_COOKIE_NAME)?;
    cookie.value().parse().ok()
}

/// Session id for this browser, issuing a fresh cookie when there is none.
pub fn ensure_session(state: &AppState, cookies: &Cookies) -> SessionId {
    if let Some(id) = session_id(cookies) {
        return id;
    }

    let id = SessionId::generate();
    debug!(session = %id, "issuing viewer session");

    let cookie = Cookie::build((SESSION_COOKIE_NAME, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!state.insecure_cookies)
        .build();
    cookies.add(cookie);

    id
}

/// The caller's viewer, or an empty one when the browser has no live session.
pub async fn load_viewer(state: &AppState, cookies: &Cookies) -> Result<Viewer, RepositoryError> {
    let Some(id) = session_id(cookies) else {
        return Ok(Viewer::default());
    };

    match state.session_repo.get(id).await {
        Err(RepositoryError::NotFound) => Ok(Viewer::default()),
        other => other,
    }
}

/// Extractor for the caller's viewer session, created on first use.
#[derive(Debug, Clone, Copy)]
pub struct ViewerSessionId(pub SessionId);

impl FromRequestParts<AppState> for ViewerSessionId {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state).await?;
        let id = ensure_session(state, &cookies);
        Span::current().record("session.id", tracing::field::display(&id));
        Ok(Self(id))
    }
}
