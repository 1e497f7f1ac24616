use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, TS, Validate)]
#[ts(export)]
pub struct GenerateHairStyleRequest {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 500, message = "prompt must be 1 to 500 characters"))]
    pub prompt: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub base64_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GenerateHairStyleResponse {
    pub image_url: String,
    pub record_id: i64,
    pub coin_cost: i32,
}
