use crate::{
    application::user_account::dto::{
        SignInRequest, SignInResponse, UpdateUserInfoRequest, UseInviteCodeRequest, UserProfile,
        WxLoginRequest, WxLoginResponse,
    },
    presentation::http::{
        errors::AppError,
        extract::{ValidatedJson, ValidatedQuery},
        middleware::user::{ensure_caller, issue_user_token},
        response::ApiResponse,
        state::AppState,
    },
};
use axum::{extract::State, http::HeaderMap};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UserQuery {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
}

pub async fn wx_login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<WxLoginRequest>,
) -> Result<ApiResponse<WxLoginResponse>, AppError> {
    let profile = state.accounts().wx_login(body).await?;
    let token = issue_user_token(&state.config, &profile.user_id)?;
    Ok(ApiResponse::ok(WxLoginResponse { profile, token }))
}

pub async fn get_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> Result<ApiResponse<UserProfile>, AppError> {
    ensure_caller(&headers, &state.config, &query.user_id)?;
    let profile = state.accounts().get_info(&query.user_id).await?;
    Ok(ApiResponse::ok(profile))
}

pub async fn update_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<UpdateUserInfoRequest>,
) -> Result<ApiResponse<()>, AppError> {
    ensure_caller(&headers, &state.config, &body.user_id)?;
    state.accounts().update_info(body).await?;
    Ok(ApiResponse::empty())
}

pub async fn sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<SignInRequest>,
) -> Result<ApiResponse<SignInResponse>, AppError> {
    ensure_caller(&headers, &state.config, &body.user_id)?;
    let coin = state.accounts().sign_in(&body.user_id).await?;
    Ok(ApiResponse::ok(SignInResponse { coin }))
}

pub async fn use_invite_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<UseInviteCodeRequest>,
) -> Result<ApiResponse<()>, AppError> {
    ensure_caller(&headers, &state.config, &body.user_id)?;
    state
        .accounts()
        .use_invite_code(&body.user_id, &body.invite_code)
        .await?;
    Ok(ApiResponse::empty())
}
