use crate::domain::user::entity::UserInfo;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, TS, Validate)]
#[ts(export)]
pub struct WxLoginRequest {
    #[validate(length(min = 1, max = 128, message = "code is required"))]
    pub code: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub nickname: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub avatar_url: Option<String>,
}

/// Public view of a user, as returned by login and profile lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub user_id: String,
    pub nickname: String,
    pub avatar_url: String,
    pub coin: i32,
    pub invite_code: String,
    pub used_invite_code: String,
    pub last_sign_in_date: Option<NaiveDate>,
}

impl UserProfile {
    pub fn from_user(user: UserInfo, default_avatar_url: &str) -> Self {
        let nickname = user.display_name();
        let avatar_url = user
            .avatar_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| default_avatar_url.to_string());
        Self {
            user_id: user.user_id,
            nickname,
            avatar_url,
            coin: user.coin,
            invite_code: user.invite_code.unwrap_or_default(),
            used_invite_code: user.used_invite_code.unwrap_or_default(),
            last_sign_in_date: user.last_sign_in_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WxLoginResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, Validate)]
#[ts(export)]
pub struct UpdateUserInfoRequest {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 32, message = "nickname must be 1 to 32 characters"))]
    pub nickname: Option<String>,
    #[serde(default)]
    #[validate(url(message = "avatar_url must be a URL"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, Validate)]
#[ts(export)]
pub struct SignInRequest {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SignInResponse {
    pub coin: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, Validate)]
#[ts(export)]
pub struct UseInviteCodeRequest {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "invite_code is required"))]
    pub invite_code: String,
}
