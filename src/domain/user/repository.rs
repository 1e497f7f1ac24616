use super::entity::UserInfo;
use super::value_objects::InviteCode;
use crate::domain::shared::errors::DomainError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Profile fields a new user may start with.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub user_id: String,
    pub coin: i32,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserInfo>, DomainError>;
    async fn create(&self, user: NewUser) -> Result<UserInfo, DomainError>;
    async fn update_profile(
        &self,
        user_id: &str,
        nickname: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<(), DomainError>;
    async fn has_balance(&self, user_id: &str, amount: i32) -> Result<bool, DomainError>;
    /// Credits `reward` once per calendar day and returns the new balance.
    async fn sign_in(&self, user_id: &str, today: NaiveDate, reward: i32)
    -> Result<i32, DomainError>;
    /// Credits the owner of `code` and marks it used by `user_id`.
    async fn redeem_invite_code(
        &self,
        user_id: &str,
        code: &InviteCode,
        reward: i32,
    ) -> Result<(), DomainError>;
}
