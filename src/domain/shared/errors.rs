use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Error, Serialize, Deserialize, TS, PartialEq, Eq)]
#[ts(export)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Insufficient coin balance")]
    InsufficientBalance,
    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::InfrastructureError(err.to_string())
    }
}
