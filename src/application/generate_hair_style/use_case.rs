use super::dto::{GenerateHairStyleRequest, GenerateHairStyleResponse};
use crate::{
    domain::{
        record::{entity::HairStyleRecord, repository::RecordRepository},
        shared::{
            errors::DomainError,
            pagination::{PageRequest, PagedResponse},
        },
        user::repository::UserRepository,
    },
    infrastructure::{
        storage::mirror::ImageMirror,
        vision::traits::{HairStyleGenerator, ImageSource, VisionError},
    },
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error("failed to store generated image: {0}")]
    Storage(anyhow::Error),
}

/// Picks the single image source of a request.
///
/// URLs must be http(s). Base64 payloads may carry a `data:` URI prefix, which
/// is stripped, and must decode to an image format we recognize.
pub fn resolve_source(
    image_url: Option<&str>,
    base64_image: Option<&str>,
) -> Result<ImageSource, DomainError> {
    let image_url = image_url.map(str::trim).filter(|s| !s.is_empty());
    let base64_image = base64_image.map(str::trim).filter(|s| !s.is_empty());

    match (image_url, base64_image) {
        (Some(_), Some(_)) => Err(DomainError::ValidationError(
            "provide either image_url or base64_image, not both".to_string(),
        )),
        (None, None) => Err(DomainError::ValidationError(
            "image_url or base64_image is required".to_string(),
        )),
        (Some(url), None) => {
            let parsed = reqwest::Url::parse(url)
                .map_err(|_| DomainError::ValidationError("image_url is not a valid URL".to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(DomainError::ValidationError(
                    "image_url must use http or https".to_string(),
                ));
            }
            Ok(ImageSource::Url(url.to_string()))
        }
        (None, Some(encoded)) => {
            let payload = match encoded.split_once(";base64,") {
                Some((prefix, data)) if prefix.starts_with("data:") => data,
                _ => encoded,
            };
            let bytes = STANDARD.decode(payload).map_err(|_| {
                DomainError::ValidationError("base64_image is not valid base64".to_string())
            })?;
            image::guess_format(&bytes).map_err(|_| {
                DomainError::ValidationError("base64_image is not a supported image".to_string())
            })?;
            Ok(ImageSource::Base64(payload.to_string()))
        }
    }
}

pub struct GenerateHairStyleUseCase {
    users: Arc<dyn UserRepository>,
    records: Arc<dyn RecordRepository>,
    generator: Arc<dyn HairStyleGenerator>,
    mirror: Arc<dyn ImageMirror>,
    cost: i32,
}

impl GenerateHairStyleUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        records: Arc<dyn RecordRepository>,
        generator: Arc<dyn HairStyleGenerator>,
        mirror: Arc<dyn ImageMirror>,
        cost: i32,
    ) -> Self {
        Self {
            users,
            records,
            generator,
            mirror,
            cost,
        }
    }

    /// Generates a restyled portrait and charges the user for it.
    ///
    /// The balance is checked before the vision API is called, and debited in
    /// the same transaction that stores the record. If that transaction fails
    /// the mirrored object is removed again.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn execute(
        &self,
        request: GenerateHairStyleRequest,
    ) -> Result<GenerateHairStyleResponse, GenerationError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(DomainError::ValidationError("prompt is required".to_string()).into());
        }
        let source = resolve_source(request.image_url.as_deref(), request.base64_image.as_deref())?;

        if !self.users.has_balance(&request.user_id, self.cost).await? {
            warn!(cost = self.cost, "insufficient balance, skipping generation");
            return Err(DomainError::InsufficientBalance.into());
        }

        let temporary_url = self.generator.generate(&source, prompt).await?;

        let stored = self
            .mirror
            .mirror(&temporary_url)
            .await
            .map_err(GenerationError::Storage)?;

        let record = match self
            .records
            .save_and_debit(&request.user_id, &stored.url, prompt, self.cost)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                if let Err(cleanup) = self.mirror.discard(&stored.key).await {
                    error!(key = %stored.key, error = %cleanup, "failed to discard orphaned image");
                }
                return Err(e.into());
            }
        };

        info!(record_id = record.id, "hairstyle generated");
        Ok(GenerateHairStyleResponse {
            image_url: record.image_url,
            record_id: record.id,
            coin_cost: self.cost,
        })
    }

    pub async fn list_records(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<PagedResponse<HairStyleRecord>, DomainError> {
        let (total, records) = self.records.list_by_user(user_id, page).await?;
        Ok(PagedResponse { total, records })
    }
}
