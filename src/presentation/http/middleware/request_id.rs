use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

const SLOW_REQUEST: Duration = Duration::from_secs(10);

/// Tags each request with a UUIDv7 id and logs one line when it completes.
pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7().to_string();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!("request", id = %request_id);
    let started = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    let elapsed = started.elapsed();

    let _guard = span.enter();
    let status = response.status().as_u16();
    let latency_ms = elapsed.as_millis() as u64;
    if response.status().is_server_error() {
        tracing::error!(%method, %path, status, latency_ms, "request failed");
    } else if elapsed > SLOW_REQUEST {
        tracing::error!(%method, %path, status, latency_ms, "slow request");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, %path, status, latency_ms, "request rejected");
    } else {
        tracing::info!(%method, %path, status, latency_ms, "request completed");
    }

    if let Ok(val) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", val);
    }
    response
}
