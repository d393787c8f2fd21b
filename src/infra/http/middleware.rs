use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics::counter;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub(crate) const METRIC_HTTP_RESPONSES: &str = "portfolio_http_responses_total";
const CACHE_STATUS_HEADER: &str = "x-cache";

/// Per-request context shared by the middleware stack and the auth extractors.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: String,
    user: Arc<OnceLock<Uuid>>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user: Arc::default(),
        }
    }

    /// Records the authenticated caller. Only the first call sticks.
    pub fn set_user(&self, user_id: Uuid) {
        let _ = self.user.set(user_id);
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.get().copied()
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::new(Uuid::new_v4().to_string());
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();
    let user_id = ctx.user_id().map(|id| id.to_string()).unwrap_or_default();
    let cache = response
        .headers()
        .get(CACHE_STATUS_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();

    counter!(METRIC_HTTP_RESPONSES, "class" => status_class(status.as_u16())).increment(1);

    if status.is_client_error() || status.is_server_error() {
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "portfolio::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = %ctx.request_id,
                user_id = %user_id,
                "request failed",
            );
        } else {
            warn!(
                target = "portfolio::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                request_id = %ctx.request_id,
                user_id = %user_id,
                "client request error",
            );
        }
    } else {
        debug!(
            target = "portfolio::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            elapsed_ms = elapsed_ms,
            cache = %cache,
            request_id = %ctx.request_id,
            user_id = %user_id,
            "request completed",
        );
    }

    response
}

fn status_class(status: u16) -> &'static str {
    match status / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        _ => "5xx",
    }
}
