use super::traits::StorageService;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Generated images larger than this are refused.
pub const MAX_MIRROR_BYTES: usize = 20 * 1024 * 1024;

/// Where a mirrored image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
}

/// Copies short-lived upstream results into permanent storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageMirror: Send + Sync {
    async fn mirror(&self, source_url: &str) -> anyhow::Result<StoredImage>;
    /// Best-effort removal of a mirrored object whose record never got persisted.
    async fn discard(&self, key: &str) -> anyhow::Result<()>;
}

/// MIME type and file extension for image bytes, preferring content sniffing over the header.
pub fn detect_image_type(data: &[u8], header_content_type: Option<&str>) -> (String, String) {
    if let Ok(format) = image::guess_format(data) {
        let ext = format.extensions_str().first().copied().unwrap_or("jpg");
        return (format.to_mime_type().to_string(), ext.to_string());
    }
    match header_content_type.map(|c| c.split(';').next().unwrap_or(c).trim()) {
        Some("image/png") => ("image/png".into(), "png".into()),
        Some("image/webp") => ("image/webp".into(), "webp".into()),
        _ => ("image/jpeg".into(), "jpg".into()),
    }
}

/// Refuses a download up front when the declared length already exceeds the limit.
pub fn check_declared_length(content_length: Option<u64>) -> anyhow::Result<()> {
    match content_length {
        Some(len) if len > MAX_MIRROR_BYTES as u64 => {
            anyhow::bail!("generated image is too large ({} bytes declared)", len)
        }
        _ => Ok(()),
    }
}

pub fn object_key(ext: &str) -> String {
    format!("hair_style/{}.{}", Uuid::now_v7(), ext)
}

pub struct HttpImageMirror {
    http: reqwest::Client,
    storage: Arc<dyn StorageService>,
}

impl HttpImageMirror {
    pub fn new(http: reqwest::Client, storage: Arc<dyn StorageService>) -> Self {
        Self { http, storage }
    }
}

#[async_trait]
impl ImageMirror for HttpImageMirror {
    #[instrument(skip(self))]
    async fn mirror(&self, source_url: &str) -> anyhow::Result<StoredImage> {
        let response = self.http.get(source_url).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            anyhow::bail!("fetching generated image failed with status {}", response.status());
        }
        let header_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        check_declared_length(response.content_length())?;
        let data = response.bytes().await?;
        if data.is_empty() {
            anyhow::bail!("generated image is empty");
        }
        if data.len() > MAX_MIRROR_BYTES {
            anyhow::bail!("generated image is too large ({} bytes)", data.len());
        }

        let (content_type, ext) = detect_image_type(&data, header_type.as_deref());
        let key = object_key(&ext);
        let url = self.storage.upload(&key, data.to_vec(), &content_type).await?;
        info!(key = %key, size = data.len(), "Mirrored generated image");
        Ok(StoredImage { key, url })
    }

    async fn discard(&self, key: &str) -> anyhow::Result<()> {
        self.storage.delete(key).await
    }
}
