use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A record shared to the public square.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, sqlx::FromRow)]
#[ts(export)]
pub struct SquareContent {
    pub id: i64,
    pub user_id: String,
    pub record_id: i64,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SquareRecord {
    pub image_url: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SquareAuthor {
    pub nickname: String,
    pub avatar_url: String,
}

/// A feed entry as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SquareItem {
    pub id: i64,
    pub user_id: String,
    pub record_id: i64,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub record: SquareRecord,
    pub user_info: SquareAuthor,
    pub is_liked: bool,
}
