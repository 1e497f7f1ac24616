use crate::domain::{
    shared::{errors::DomainError, pagination::CursorRequest},
    square::{
        entity::{SquareAuthor, SquareContent, SquareItem, SquareRecord},
        like::{LikeRecord, LikeState},
        repository::SquareRepository,
    },
    user::entity::fallback_nickname,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

pub struct SqlxSquareRepository {
    pub pool: PgPool,
}

impl SqlxSquareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FeedRow {
    id: i64,
    user_id: String,
    record_id: i64,
    like_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    image_url: String,
    prompt: String,
    record_created_at: DateTime<Utc>,
    nickname: Option<String>,
    avatar_url: Option<String>,
    is_liked: bool,
}

impl FeedRow {
    fn into_item(self, default_avatar_url: &str) -> SquareItem {
        let nickname = match self.nickname.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => fallback_nickname(&self.user_id),
        };
        let avatar_url = match self.avatar_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => default_avatar_url.to_string(),
        };
        SquareItem {
            id: self.id,
            user_id: self.user_id,
            record_id: self.record_id,
            like_count: self.like_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
            record: SquareRecord {
                image_url: self.image_url,
                prompt: self.prompt,
                created_at: self.record_created_at,
            },
            user_info: SquareAuthor {
                nickname,
                avatar_url,
            },
            is_liked: self.is_liked,
        }
    }
}

#[async_trait]
impl SquareRepository for SqlxSquareRepository {
    async fn share(&self, user_id: &str, record_id: i64) -> Result<SquareContent, DomainError> {
        let owner = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM hair_style_records WHERE id = $1",
        )
        .bind(record_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("record {}", record_id)))?;

        if owner != user_id {
            return Err(DomainError::NotFound(format!("record {}", record_id)));
        }

        let content = sqlx::query_as::<_, SquareContent>(
            "INSERT INTO square_content (user_id, record_id) VALUES ($1, $2) \
             ON CONFLICT (record_id) DO NOTHING \
             RETURNING id, user_id, record_id, like_count, created_at, updated_at",
        )
        .bind(user_id)
        .bind(record_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DomainError::Conflict("record already shared".to_string()))?;

        Ok(content)
    }

    async fn list(
        &self,
        viewer_id: &str,
        cursor: CursorRequest,
        default_avatar_url: &str,
    ) -> Result<(i64, Vec<SquareItem>), DomainError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM square_content")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, FeedRow>(
            "SELECT s.id, s.user_id, s.record_id, s.like_count, s.created_at, s.updated_at, \
                    r.image_url, r.prompt, r.created_at AS record_created_at, \
                    u.nickname, u.avatar_url, \
                    EXISTS(SELECT 1 FROM like_record l WHERE l.content_id = s.id AND l.user_id = $1) AS is_liked \
             FROM square_content s \
             JOIN hair_style_records r ON r.id = s.record_id \
             LEFT JOIN user_info u ON u.user_id = s.user_id \
             WHERE s.id < $2 \
             ORDER BY s.id DESC \
             LIMIT $3",
        )
        .bind(viewer_id)
        .bind(cursor.upper_bound())
        .bind(cursor.page_size)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|row| row.into_item(default_avatar_url))
            .collect();
        Ok((total, items))
    }

    async fn toggle_like(&self, user_id: &str, content_id: i64) -> Result<LikeState, DomainError> {
        let mut tx = self.pool.begin().await?;

        // Lock the content row so concurrent toggles on it serialize.
        sqlx::query_scalar::<_, i64>("SELECT id FROM square_content WHERE id = $1 FOR UPDATE")
            .bind(content_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("square content {}", content_id)))?;

        let existing = sqlx::query_as::<_, LikeRecord>(
            "SELECT id, user_id, content_id, created_at FROM like_record \
             WHERE user_id = $1 AND content_id = $2",
        )
        .bind(user_id)
        .bind(content_id)
        .fetch_optional(&mut *tx)
        .await?;

        let is_liked = match existing {
            Some(like) => {
                debug!(like_id = like.id, "removing like");
                sqlx::query("DELETE FROM like_record WHERE id = $1")
                    .bind(like.id)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query(
                    "UPDATE square_content SET like_count = GREATEST(0, like_count - 1), updated_at = NOW() WHERE id = $1",
                )
                .bind(content_id)
                .execute(&mut *tx)
                .await?;
                false
            }
            None => {
                sqlx::query("INSERT INTO like_record (user_id, content_id) VALUES ($1, $2)")
                    .bind(user_id)
                    .bind(content_id)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query(
                    "UPDATE square_content SET like_count = like_count + 1, updated_at = NOW() WHERE id = $1",
                )
                .bind(content_id)
                .execute(&mut *tx)
                .await?;
                true
            }
        };

        let like_count =
            sqlx::query_scalar::<_, i32>("SELECT like_count FROM square_content WHERE id = $1")
                .bind(content_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(LikeState {
            is_liked,
            like_count,
        })
    }
}
