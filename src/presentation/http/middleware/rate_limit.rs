use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use redis::AsyncCommands;

use crate::presentation::http::{errors::AppError, state::AppState};

pub fn extract_client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or("127.0.0.1")
        .to_string()
}

/// Daily per-IP cap on generations. Off when Redis is not configured.
pub async fn generation_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.config.rate_limit_generations_per_ip;
    let Some(redis) = state.redis.as_ref() else {
        return Ok(next.run(request).await);
    };
    let ip = extract_client_ip(request.headers());
    if limit == 0 || ip == "127.0.0.1" || ip == "::1" {
        return Ok(next.run(request).await);
    }
    let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let key = format!("rate_limit:generate:{}:{}", ip, date);

    let mut conn = redis.get_multiplexed_async_connection().await?;
    let count: u32 = conn.incr(&key, 1_u32).await?;
    if count == 1 {
        let _: () = conn.expire(&key, 86_400).await?;
    }

    if count > limit {
        tracing::warn!(%ip, count, limit, "generation rate limit hit");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}
