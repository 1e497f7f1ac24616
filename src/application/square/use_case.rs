use super::dto::ShareResponse;
use crate::domain::{
    shared::{
        errors::DomainError,
        pagination::{CursorRequest, CursorResponse},
    },
    square::{entity::SquareItem, like::LikeState, repository::SquareRepository},
};
use std::sync::Arc;
use tracing::info;

pub struct SquareUseCase {
    repository: Arc<dyn SquareRepository>,
    default_avatar_url: String,
}

impl SquareUseCase {
    pub fn new(repository: Arc<dyn SquareRepository>, default_avatar_url: impl Into<String>) -> Self {
        Self {
            repository,
            default_avatar_url: default_avatar_url.into(),
        }
    }

    pub async fn share(&self, user_id: &str, record_id: i64) -> Result<ShareResponse, DomainError> {
        let content = self.repository.share(user_id, record_id).await?;
        info!(content_id = content.id, record_id, "record shared to square");
        Ok(ShareResponse {
            content_id: content.id,
        })
    }

    pub async fn list(
        &self,
        viewer_id: &str,
        cursor: CursorRequest,
    ) -> Result<CursorResponse<SquareItem>, DomainError> {
        let (total, records) = self
            .repository
            .list(viewer_id, cursor, &self.default_avatar_url)
            .await?;
        let next_cursor = cursor.next_cursor(records.len(), records.last().map(|item| item.id));
        Ok(CursorResponse {
            total,
            records,
            next_cursor,
        })
    }

    pub async fn toggle_like(&self, user_id: &str, content_id: i64) -> Result<LikeState, DomainError> {
        self.repository.toggle_like(user_id, content_id).await
    }
}
