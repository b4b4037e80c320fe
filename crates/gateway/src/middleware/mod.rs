//! Request middleware

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use trendcaster_common::{errors::AppError, metrics::RequestMetrics};

/// Count and time every routed request by its route template
pub async fn track_requests(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let metrics = RequestMetrics::start(request.method().as_str(), &endpoint);
    let response = next.run(request).await;
    metrics.finish(response.status().as_u16());
    response
}

/// Abandon requests that outlive `limit` with the standard error envelope
pub async fn enforce_timeout(State(limit): State<Duration>, request: Request, next: Next) -> Response {
    let uri = request.uri().path().to_string();
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(uri = %uri, timeout_secs = limit.as_secs(), "Request timed out");
            AppError::unavailable(
                "gateway",
                format!("request timed out after {}s", limit.as_secs()),
            )
            .into_response()
        }
    }
}
