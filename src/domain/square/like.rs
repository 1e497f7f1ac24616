use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LikeRecord {
    pub id: i64,
    pub user_id: String,
    pub content_id: i64,
    pub created_at: DateTime<Utc>,
}

/// State of a like after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LikeState {
    pub is_liked: bool,
    pub like_count: i32,
}
