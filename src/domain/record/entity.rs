use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One successful hairstyle generation.
///
/// `image_url` always points at permanent object storage, never at the
/// short-lived URL returned by the vision API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, sqlx::FromRow)]
#[ts(export)]
pub struct HairStyleRecord {
    pub id: i64,
    pub user_id: String,
    pub image_url: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}
