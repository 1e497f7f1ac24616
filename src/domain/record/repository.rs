use super::entity::HairStyleRecord;
use crate::domain::shared::{errors::DomainError, pagination::PageRequest};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Persists the record and debits `cost` coins in one transaction.
    ///
    /// Fails with [`DomainError::InsufficientBalance`] and writes nothing when
    /// the balance dropped below `cost` since it was last checked.
    async fn save_and_debit(
        &self,
        user_id: &str,
        image_url: &str,
        prompt: &str,
        cost: i32,
    ) -> Result<HairStyleRecord, DomainError>;
    /// Returns the total count and the requested page, newest first.
    async fn list_by_user(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<(i64, Vec<HairStyleRecord>), DomainError>;
}
