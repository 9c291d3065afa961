use std::collections::HashMap;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};
use tracing::warn;

/// Default lookup budget per client address.
pub const DEFAULT_LOOKUPS_PER_MINUTE: u32 = 30;

/// Past this many tracked clients, buckets that have refilled are forgotten.
const PRUNE_THRESHOLD: usize = 4096;

struct Allowance {
    tokens: f64,
    refreshed: Instant,
}

struct ClientBudgets {
    allowances: Mutex<HashMap<IpAddr, Allowance>>,
    burst: f64,
    refill_per_sec: f64,
}

impl ClientBudgets {
    fn new(burst: u32, window: Duration) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            allowances: Mutex::new(HashMap::new()),
            burst,
            refill_per_sec: burst / window.as_secs_f64(),
        }
    }

    fn refill(&self, allowance: &mut Allowance, now: Instant) {
        let elapsed = now.duration_since(allowance.refreshed).as_secs_f64();
        allowance.tokens = (allowance.tokens + elapsed * self.refill_per_sec).min(self.burst);
        allowance.refreshed = now;
    }

    /// Spend one token for `client`; false when its budget is used up.
    fn take(&self, client: IpAddr) -> bool {
        let mut allowances = self
            .allowances
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        if allowances.len() >= PRUNE_THRESHOLD {
            allowances.retain(|_, allowance| {
                self.refill(allowance, now);
                allowance.tokens < self.burst
            });
        }

        let allowance = allowances.entry(client).or_insert(Allowance {
            tokens: self.burst,
            refreshed: now,
        });
        self.refill(allowance, now);

        if allowance.tokens >= 1.0 {
            allowance.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-client token bucket for the lookup endpoints (search, parse, resolve).
///
/// Clones share one budget, so every route wrapped by the same layer draws
/// from the same allowance. Requests without `ConnectInfo` pass through.
#[derive(Clone)]
pub struct LookupRateLimitLayer {
    budgets: Arc<ClientBudgets>,
}

impl LookupRateLimitLayer {
    pub fn per_minute(lookups: u32) -> Self {
        Self {
            budgets: Arc::new(ClientBudgets::new(lookups, Duration::from_secs(60))),
        }
    }
}

impl<S> Layer<S> for LookupRateLimitLayer {
    type Service = LookupRateLimit<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LookupRateLimit {
            inner,
            budgets: Arc::clone(&self.budgets),
        }
    }
}

#[derive(Clone)]
pub struct LookupRateLimit<S> {
    inner: S,
    budgets: Arc<ClientBudgets>,
}

impl<S> Service<Request<Body>> for LookupRateLimit<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let budgets = Arc::clone(&self.budgets);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let client = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip());

            if let Some(client) = client
                && !budgets.take(client)
            {
                warn!(%client, path = request.uri().path(), "lookup rate limit exceeded");
                return Ok(StatusCode::TOO_MANY_REQUESTS.into_response());
            }

            inner.call(request).await
        })
    }
}
