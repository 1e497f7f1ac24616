use super::dto::{UpdateUserInfoRequest, UserProfile, WxLoginRequest};
use crate::{
    domain::{
        shared::errors::DomainError,
        user::{
            entity::UserInfo,
            repository::{NewUser, UserRepository},
            value_objects::{InviteCode, Nickname},
        },
    },
    infrastructure::wechat::client::{WechatAuthenticator, WechatError},
};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Wechat(#[from] WechatError),
}

/// Coin amounts credited or granted by account operations.
#[derive(Debug, Clone, Copy)]
pub struct Rewards {
    pub initial_coin: i32,
    pub sign_in: i32,
    pub invite: i32,
}

pub struct UserAccountUseCase {
    users: Arc<dyn UserRepository>,
    wechat: Arc<dyn WechatAuthenticator>,
    rewards: Rewards,
    sign_in_offset: FixedOffset,
    default_avatar_url: String,
}

/// Calendar day of `now` in the given offset.
pub fn local_day(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

impl UserAccountUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        wechat: Arc<dyn WechatAuthenticator>,
        rewards: Rewards,
        sign_in_utc_offset_hours: i32,
        default_avatar_url: impl Into<String>,
    ) -> Self {
        let sign_in_offset = FixedOffset::east_opt(sign_in_utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix());
        Self {
            users,
            wechat,
            rewards,
            sign_in_offset,
            default_avatar_url: default_avatar_url.into(),
        }
    }

    fn profile(&self, user: UserInfo) -> UserProfile {
        UserProfile::from_user(user, &self.default_avatar_url)
    }

    /// Exchanges a WeChat login code and returns the caller's profile,
    /// creating the account on first login.
    #[instrument(skip_all)]
    pub async fn wx_login(&self, request: WxLoginRequest) -> Result<UserProfile, AccountError> {
        let session = self.wechat.code_to_session(request.code.trim()).await?;

        if let Some(existing) = self.users.find_by_user_id(&session.openid).await? {
            return Ok(self.profile(existing));
        }

        let new_user = NewUser {
            user_id: session.openid.clone(),
            coin: self.rewards.initial_coin,
            nickname: request.nickname.filter(|n| !n.trim().is_empty()),
            avatar_url: request.avatar_url.filter(|a| !a.trim().is_empty()),
        };
        let user = match self.users.create(new_user).await {
            Ok(user) => user,
            // A concurrent first login for the same openid won the insert.
            Err(DomainError::Conflict(_)) => self
                .users
                .find_by_user_id(&session.openid)
                .await?
                .ok_or_else(|| DomainError::NotFound(format!("user {}", session.openid)))?,
            Err(e) => return Err(e.into()),
        };
        info!(user_id = %user.user_id, coin = user.coin, "new user registered");
        Ok(self.profile(user))
    }

    pub async fn get_info(&self, user_id: &str) -> Result<UserProfile, DomainError> {
        let user = self
            .users
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user {}", user_id)))?;
        Ok(self.profile(user))
    }

    pub async fn update_info(&self, request: UpdateUserInfoRequest) -> Result<(), DomainError> {
        if request.nickname.is_none() && request.avatar_url.is_none() {
            return Err(DomainError::ValidationError(
                "nickname or avatar_url is required".to_string(),
            ));
        }
        let nickname = request
            .nickname
            .as_deref()
            .map(Nickname::new)
            .transpose()
            .map_err(|_| {
                DomainError::ValidationError("nickname must be 1 to 32 characters".to_string())
            })?
            .map(|n| n.value);
        let avatar_url = request.avatar_url.map(|a| a.trim().to_string());
        self.users
            .update_profile(&request.user_id, nickname, avatar_url)
            .await
    }

    pub async fn sign_in(&self, user_id: &str) -> Result<i32, DomainError> {
        self.sign_in_at(user_id, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn sign_in_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<i32, DomainError> {
        let today = local_day(now, self.sign_in_offset);
        let coin = self
            .users
            .sign_in(user_id, today, self.rewards.sign_in)
            .await?;
        info!(%today, coin, "daily sign-in");
        Ok(coin)
    }

    #[instrument(skip(self))]
    pub async fn use_invite_code(&self, user_id: &str, code: &str) -> Result<(), DomainError> {
        let code = InviteCode::new(code).map_err(|_| {
            DomainError::ValidationError("invite code must be 6 characters of 0-9 or A-Z".to_string())
        })?;
        self.users
            .redeem_invite_code(user_id, &code, self.rewards.invite)
            .await
    }
}
