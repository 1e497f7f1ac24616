use crate::domain::{
    record::{entity::HairStyleRecord, repository::RecordRepository},
    shared::{errors::DomainError, pagination::PageRequest},
};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct SqlxRecordRepository {
    pub pool: PgPool,
}

impl SqlxRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordRepository for SqlxRecordRepository {
    async fn save_and_debit(
        &self,
        user_id: &str,
        image_url: &str,
        prompt: &str,
        cost: i32,
    ) -> Result<HairStyleRecord, DomainError> {
        let mut tx = self.pool.begin().await?;

        let debited = sqlx::query(
            "UPDATE user_info SET coin = coin - $2, updated_at = NOW() \
             WHERE user_id = $1 AND coin >= $2",
        )
        .bind(user_id)
        .bind(cost)
        .execute(&mut *tx)
        .await?;

        if debited.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM user_info WHERE user_id = $1)",
            )
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
            return Err(if exists {
                DomainError::InsufficientBalance
            } else {
                DomainError::NotFound(format!("user {}", user_id))
            });
        }

        let record = sqlx::query_as::<_, HairStyleRecord>(
            "INSERT INTO hair_style_records (user_id, image_url, prompt) \
             VALUES ($1, $2, $3) \
             RETURNING id, user_id, image_url, prompt, created_at",
        )
        .bind(user_id)
        .bind(image_url)
        .bind(prompt)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<(i64, Vec<HairStyleRecord>), DomainError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM hair_style_records WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let records = sqlx::query_as::<_, HairStyleRecord>(
            "SELECT id, user_id, image_url, prompt, created_at \
             FROM hair_style_records \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((total, records))
    }
}
