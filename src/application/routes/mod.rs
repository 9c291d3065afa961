pub mod api;
pub mod app;

use askama::Template;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::response::Html;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span, error, warn};

use crate::application::rate_limit::LookupRateLimitLayer;
use crate::application::state::AppState;
use crate::domain::locator::ResourceLocator;

use crate::presentation::web::templates::render_template;

/// Bulk pastes are plain text; 1 MB is plenty.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn app_router(state: AppState) -> axum::Router {
    let csp = content_security_policy(&state.locator);
    let lookup_limit = LookupRateLimitLayer::per_minute(state.lookups_per_minute);

    axum::Router::new()
        .merge(app::router(lookup_limit.clone()))
        .nest("/api/v1", api::router(lookup_limit))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(VisorMakeSpan)
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CookieManagerLayer::new())
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
                .layer(SetResponseHeaderLayer::overriding(
                    axum::http::header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    axum::http::header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    axum::http::header::REFERRER_POLICY,
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    axum::http::header::CONTENT_SECURITY_POLICY,
                    csp,
                ))
                .layer(CompressionLayer::new().gzip(true)),
        )
        .with_state(state)
}

/// CSP that lets the page embed the PDF backend and load bucket images.
fn content_security_policy(locator: &ResourceLocator) -> HeaderValue {
    let backends = locator.origins().join(" ");
    let policy = format!(
        "default-src 'self'; \
         script-src 'self' 'unsafe-inline'; \
         style-src 'self' 'unsafe-inline'; \
         img-src 'self' data: {backends}; \
         frame-src {backends}; \
         frame-ancestors 'none'"
    );

    HeaderValue::from_str(&policy).unwrap_or_else(|err| {
        warn!(error = %err, "backend origins not valid in a header; embedding disabled");
        HeaderValue::from_static("default-src 'self'; frame-ancestors 'none'")
    })
}

#[derive(Clone)]
struct VisorMakeSpan;

impl<B> MakeSpan<B> for VisorMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
            session.id = tracing::field::Empty,
        )
    }
}

pub(crate) fn render_html<T: Template>(template: T) -> Result<Html<String>, StatusCode> {
    render_template(template).map(Html).map_err(|err| {
        error!(error = %err, "failed to render template");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
