use super::entity::{SquareContent, SquareItem};
use super::like::LikeState;
use crate::domain::shared::{errors::DomainError, pagination::CursorRequest};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SquareRepository: Send + Sync {
    async fn share(&self, user_id: &str, record_id: i64) -> Result<SquareContent, DomainError>;
    /// Returns the total number of shared items and one page of the feed.
    async fn list(
        &self,
        viewer_id: &str,
        cursor: CursorRequest,
        default_avatar_url: &str,
    ) -> Result<(i64, Vec<SquareItem>), DomainError>;
    async fn toggle_like(&self, user_id: &str, content_id: i64) -> Result<LikeState, DomainError>;
}
