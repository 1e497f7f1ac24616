use crate::{
    application::generate_hair_style::dto::{GenerateHairStyleRequest, GenerateHairStyleResponse},
    domain::{
        record::entity::HairStyleRecord,
        shared::pagination::{PageRequest, PagedResponse},
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
pub struct RecordsQuery {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

pub async fn generate_hair_style(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<GenerateHairStyleRequest>,
) -> Result<ApiResponse<GenerateHairStyleResponse>, AppError> {
    ensure_caller(&headers, &state.config, &body.user_id)?;
    let response = state.generation().execute(body).await?;
    Ok(ApiResponse::ok(response))
}

pub async fn list_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedQuery(query): ValidatedQuery<RecordsQuery>,
) -> Result<ApiResponse<PagedResponse<HairStyleRecord>>, AppError> {
    ensure_caller(&headers, &state.config, &query.user_id)?;
    let page = PageRequest::new(query.page, query.page_size);
    let records = state.generation().list_records(&query.user_id, page).await?;
    Ok(ApiResponse::ok(records))
}
