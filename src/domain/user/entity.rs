use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A mini-program user, keyed by the WeChat openid.
///
/// # Invariants
/// - `user_id` is unique and never changes after creation
/// - `coin` is never negative
/// - `invite_code` is unique across users; `used_invite_code` is set at most once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, sqlx::FromRow)]
#[ts(export)]
pub struct UserInfo {
    pub id: i64,
    pub user_id: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub coin: i32,
    pub invite_code: Option<String>,
    pub used_invite_code: Option<String>,
    pub last_sign_in_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserInfo {
    pub fn has_signed_in_on(&self, day: NaiveDate) -> bool {
        self.last_sign_in_date == Some(day)
    }

    pub fn has_used_invite_code(&self) -> bool {
        self.used_invite_code
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    /// Nickname shown publicly when the user never set one.
    pub fn display_name(&self) -> String {
        match self.nickname.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => fallback_nickname(&self.user_id),
        }
    }
}

/// `User` followed by the last six characters of the openid.
pub fn fallback_nickname(user_id: &str) -> String {
    let chars: Vec<char> = user_id.chars().collect();
    let start = chars.len().saturating_sub(6);
    format!("User{}", chars[start..].iter().collect::<String>())
}
