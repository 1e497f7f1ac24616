use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::errors::AppError;

/// JSON body that has been deserialized and validated.
///
/// Malformed bodies and failed validation both surface as 400 envelopes.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::BadRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| AppError::ValidationError(describe(&errors)))?;
        Ok(Self(value))
    }
}

/// First message per failing field, sorted by field name.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let name: &str = field.as_ref();
            let detail = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "is invalid".to_string());
            if detail.starts_with(name) {
                detail
            } else {
                format!("{}: {}", name, detail)
            }
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

/// Query string deserialized into `T`, with rejections mapped to a 400 envelope.
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| AppError::BadRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| AppError::ValidationError(describe(&errors)))?;
        Ok(Self(value))
    }
}
