use crate::domain::{
    shared::errors::DomainError,
    user::{
        entity::UserInfo,
        repository::{NewUser, UserRepository},
        value_objects::InviteCode,
    },
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{info, warn};

const USER_COLUMNS: &str = "id, user_id, nickname, avatar_url, coin, invite_code, \
     used_invite_code, last_sign_in_date, created_at, updated_at";

const INVITE_CODE_ATTEMPTS: usize = 5;

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Name of the unique constraint a failed insert tripped over, if any.
fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserInfo>, DomainError> {
        let user = sqlx::query_as::<_, UserInfo>(&format!(
            "SELECT {USER_COLUMNS} FROM user_info WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<UserInfo, DomainError> {
        for attempt in 1..=INVITE_CODE_ATTEMPTS {
            let code = InviteCode::generate();
            let inserted = sqlx::query_as::<_, UserInfo>(&format!(
                "INSERT INTO user_info (user_id, nickname, avatar_url, coin, invite_code) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {USER_COLUMNS}"
            ))
            .bind(&user.user_id)
            .bind(&user.nickname)
            .bind(&user.avatar_url)
            .bind(user.coin)
            .bind(code.as_str())
            .fetch_one(&self.pool)
            .await;

            match inserted {
                Ok(created) => {
                    info!(user_id = %created.user_id, "user created");
                    return Ok(created);
                }
                Err(e) => match unique_violation(&e) {
                    Some(constraint) if constraint.contains("invite_code") => {
                        warn!(attempt, "invite code collision, regenerating");
                    }
                    Some(_) => {
                        return Err(DomainError::Conflict(format!(
                            "user {} already exists",
                            user.user_id
                        )));
                    }
                    None => return Err(e.into()),
                },
            }
        }
        Err(DomainError::InfrastructureError(
            "could not allocate a unique invite code".to_string(),
        ))
    }

    async fn update_profile(
        &self,
        user_id: &str,
        nickname: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE user_info \
             SET nickname = COALESCE($2, nickname), \
                 avatar_url = COALESCE($3, avatar_url), \
                 updated_at = NOW() \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(nickname)
        .bind(avatar_url)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    async fn has_balance(&self, user_id: &str, amount: i32) -> Result<bool, DomainError> {
        let coin = sqlx::query_scalar::<_, i32>("SELECT coin FROM user_info WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user {}", user_id)))?;
        Ok(coin >= amount)
    }

    async fn sign_in(
        &self,
        user_id: &str,
        today: NaiveDate,
        reward: i32,
    ) -> Result<i32, DomainError> {
        let mut tx = self.pool.begin().await?;

        let last = sqlx::query_scalar::<_, Option<NaiveDate>>(
            "SELECT last_sign_in_date FROM user_info WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("user {}", user_id)))?;

        if last == Some(today) {
            return Err(DomainError::Conflict("already signed in today".to_string()));
        }

        let coin = sqlx::query_scalar::<_, i32>(
            "UPDATE user_info \
             SET coin = coin + $2, last_sign_in_date = $3, updated_at = NOW() \
             WHERE user_id = $1 \
             RETURNING coin",
        )
        .bind(user_id)
        .bind(reward)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(coin)
    }

    async fn redeem_invite_code(
        &self,
        user_id: &str,
        code: &InviteCode,
        reward: i32,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await?;

        let redeemer = sqlx::query_as::<_, UserInfo>(&format!(
            "SELECT {USER_COLUMNS} FROM user_info WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("user {}", user_id)))?;

        if redeemer.has_used_invite_code() {
            return Err(DomainError::Conflict(
                "an invite code has already been used".to_string(),
            ));
        }
        if redeemer.invite_code.as_deref() == Some(code.as_str()) {
            return Err(DomainError::ValidationError(
                "cannot use your own invite code".to_string(),
            ));
        }

        let credited = sqlx::query(
            "UPDATE user_info SET coin = coin + $2, updated_at = NOW() WHERE invite_code = $1",
        )
        .bind(code.as_str())
        .bind(reward)
        .execute(&mut *tx)
        .await?;
        if credited.rows_affected() == 0 {
            return Err(DomainError::NotFound("invite code".to_string()));
        }

        sqlx::query(
            "UPDATE user_info SET used_invite_code = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(code.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(user_id, invite_code = code.as_str(), "invite code redeemed");
        Ok(())
    }
}
