use crate::api::AppState;
use axum::{extract::State, http::HeaderValue, response::IntoResponse};
use std::sync::Arc;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

/// Wraps every routed request in a `request` span and emits one summary event
/// when it finishes.
///
/// `actor` and `role` are filled in by the `CurrentActor` extractor and
/// `entity_id` by path validation, so the summary names who touched which row.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        route = %route,
        actor = tracing::field::Empty,
        role = tracing::field::Empty,
        entity_id = tracing::field::Empty,
    );

    async move {
        let mut response = next.run(req).await;

        let elapsed = started.elapsed();
        let status = response.status();
        let mutating = method != Method::GET;

        // Route template, not the raw path, to keep label cardinality bounded.
        let labels = [
            ("method", method.to_string()),
            ("path", route.clone()),
            ("status", status.as_u16().to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if status.is_server_error() {
            error!(status_code = status.as_u16(), duration_ms, mutating, "Request failed");
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status_code = status.as_u16(), duration_ms, mutating, "Request refused");
        } else {
            info!(status_code = status.as_u16(), duration_ms, mutating, "Request finished");
        }

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'; base-uri 'none'"),
    );
    headers.insert("cache-control", HeaderValue::from_static("no-store"));

    response
}
