use crate::{
    application::square::dto::{LikeRequest, ShareRequest, ShareResponse},
    domain::{
        shared::pagination::{CursorRequest, CursorResponse},
        square::{entity::SquareItem, like::LikeState},
    },
    presentation::http::{
        errors::AppError,
        extract::{ValidatedJson, ValidatedQuery},
        middleware::user::ensure_caller,
        response::ApiResponse,
        state::AppState,
    },
};
use axum::{extract::State, http::HeaderMap};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ContentsQuery {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "cursor cannot be negative"))]
    pub cursor: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_size() -> i64 {
    10
}

pub async fn share(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<ShareRequest>,
) -> Result<ApiResponse<ShareResponse>, AppError> {
    ensure_caller(&headers, &state.config, &body.user_id)?;
    let response = state.square().share(&body.user_id, body.record_id).await?;
    Ok(ApiResponse::ok(response))
}

pub async fn list_contents(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedQuery(query): ValidatedQuery<ContentsQuery>,
) -> Result<ApiResponse<CursorResponse<SquareItem>>, AppError> {
    ensure_caller(&headers, &state.config, &query.user_id)?;
    let cursor = CursorRequest::new(query.cursor, query.page_size);
    let page = state.square().list(&query.user_id, cursor).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<LikeRequest>,
) -> Result<ApiResponse<LikeState>, AppError> {
    ensure_caller(&headers, &state.config, &body.user_id)?;
    let like = state.square().toggle_like(&body.user_id, body.content_id).await?;
    Ok(ApiResponse::ok(like))
}
