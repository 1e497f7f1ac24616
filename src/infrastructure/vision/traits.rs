use async_trait::async_trait;
use thiserror::Error;

/// Where the portrait to restyle comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    Base64(String),
}

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("vision API is throttling requests")]
    Throttled,
    #[error("vision API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("vision API response carried no image: {0}")]
    MissingImage(String),
    #[error("vision API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HairStyleGenerator: Send + Sync {
    /// Restyles the portrait according to `prompt` and returns the temporary URL of the result.
    async fn generate(&self, source: &ImageSource, prompt: &str) -> Result<String, VisionError>;
}
