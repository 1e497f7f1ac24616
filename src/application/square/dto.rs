use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, TS, Validate)]
#[ts(export)]
pub struct ShareRequest {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
    #[validate(range(min = 1, message = "record_id must be positive"))]
    pub record_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShareResponse {
    pub content_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, Validate)]
#[ts(export)]
pub struct LikeRequest {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
    #[validate(range(min = 1, message = "content_id must be positive"))]
    pub content_id: i64,
}
