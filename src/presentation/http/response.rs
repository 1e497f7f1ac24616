use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Success envelope: `{"code":0,"message":"success","data":...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            message: "success",
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn empty() -> Self {
        Self {
            code: 0,
            message: "success",
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
