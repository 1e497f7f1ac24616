//! HTTP error handling and response conversion.
//!
//! Every failure leaves the API as the common envelope
//! `{"code": <http status>, "message": <user-safe text>}`. Full detail is
//! logged at a level chosen by status; 5xx messages shown to clients never
//! carry implementation detail.

use crate::{
    application::{generate_hair_style::use_case::GenerationError, user_account::use_case::AccountError},
    domain::shared::errors::DomainError,
    infrastructure::{vision::traits::VisionError, wechat::client::WechatError},
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Application-level errors returned from handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found (404).
    NotFound(String),

    /// Malformed request (400).
    BadRequest(String),

    /// Caller identity does not match the token (403).
    Forbidden(String),

    /// Request data failed validation (400).
    ValidationError(String),

    /// Not enough coins for the operation (400).
    InsufficientBalance,

    /// Operation already happened (409).
    Conflict(String),

    /// Rate limit exceeded (429).
    RateLimited,

    /// Vision API asked us to back off (503).
    UpstreamBusy,

    /// Vision API or WeChat failed (502).
    BadGateway(String),

    /// Database operation failed (500).
    Database(String),

    /// Storage operation failed (500).
    Storage(String),

    /// Redis operation failed (500).
    Cache(String),

    /// Unclassified internal error (500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::InsufficientBalance => write!(f, "Insufficient coin balance"),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::RateLimited => write!(f, "Rate limit exceeded"),
            Self::UpstreamBusy => write!(f, "Upstream throttled"),
            Self::BadGateway(msg) => write!(f, "Upstream error: {}", msg),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
            Self::Cache(msg) => write!(f, "Cache error: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl AppError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::ValidationError(_) | Self::InsufficientBalance => {
                StatusCode::BAD_REQUEST
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamBusy => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Storage(_) | Self::Cache(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a user-safe error message (without implementation details).
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(what) => format!("{} not found", what),
            Self::BadRequest(msg) | Self::ValidationError(msg) | Self::Conflict(msg) => msg.clone(),
            Self::Forbidden(_) => "Access denied".into(),
            Self::InsufficientBalance => "Insufficient coins".into(),
            Self::RateLimited => "Too many requests, please try again later".into(),
            Self::UpstreamBusy => "Too many requests, please retry in 5 seconds".into(),
            Self::BadGateway(_) => "Upstream service failed".into(),
            Self::Database(_) => "Database operation failed".into(),
            Self::Storage(_) => "File operation failed".into(),
            Self::Cache(_) | Self::Internal(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        if status.is_server_error() {
            tracing::error!("error={}", self);
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::debug!("error={}", self);
        } else {
            tracing::warn!("error={}", self);
        }

        (
            status,
            Json(json!({ "code": status.as_u16(), "message": message })),
        )
            .into_response()
    }
}

// === Domain Error Conversion ===

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(msg) => AppError::NotFound(msg),
            DomainError::ValidationError(msg) => AppError::ValidationError(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::InsufficientBalance => AppError::InsufficientBalance,
            DomainError::InfrastructureError(msg) => {
                tracing::error!(infrastructure_error = %msg);
                AppError::Database(msg)
            }
        }
    }
}

// === Upstream Error Conversion ===

impl From<VisionError> for AppError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Throttled => AppError::UpstreamBusy,
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

impl From<WechatError> for AppError {
    fn from(err: WechatError) -> Self {
        match err {
            WechatError::Rejected { errcode, errmsg } => {
                AppError::BadGateway(format!("WeChat login failed ({}): {}", errcode, errmsg))
            }
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Domain(e) => e.into(),
            GenerationError::Vision(e) => e.into(),
            GenerationError::Storage(e) => {
                err_chain("storage", &e);
                AppError::Storage(e.to_string())
            }
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Domain(e) => e.into(),
            AccountError::Wechat(e) => e.into(),
        }
    }
}

// === Database Error Conversion ===

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record".into()),
            sqlx::Error::PoolTimedOut => {
                tracing::warn!("Database connection pool exhausted, timing out");
                AppError::Database("Connection pool exhausted".into())
            }
            sqlx::Error::PoolClosed => {
                tracing::error!("Database connection pool closed");
                AppError::Database("Database connection unavailable".into())
            }
            _ => {
                tracing::error!(database_error = %err);
                AppError::Database("Database error".into())
            }
        }
    }
}

// === Redis Error Conversion ===

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!(redis_error = %err, "Redis operation failed");
        AppError::Cache(format!("Redis error: {}", err))
    }
}

// === HTTP Client Error Conversion ===

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            tracing::warn!(reqwest_timeout = %err);
            AppError::BadGateway("Request timeout".into())
        } else if err.is_connect() {
            tracing::warn!(reqwest_connect = %err);
            AppError::BadGateway("Connection failed".into())
        } else {
            tracing::error!(reqwest_error = %err);
            AppError::BadGateway("External service unavailable".into())
        }
    }
}

// === General Fallback Error Conversion ===

fn err_chain(kind: &str, err: &anyhow::Error) {
    tracing::error!(kind, error = %err, "Unclassified error with chain");
    err.chain().skip(1).for_each(|cause| {
        tracing::error!(cause = %cause, "Error source");
    });
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        err_chain("internal", &err);
        AppError::Internal("Operation failed".into())
    }
}
