use super::traits::StorageService;
use crate::config::CosConfig;
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, RequestChecksumCalculation},
    primitives::ByteStream,
};

/// Tencent COS through its S3-compatible endpoint.
pub struct CosStorageService {
    client: Client,
    bucket: String,
    public_url: String,
}

impl CosStorageService {
    pub fn new(config: &CosConfig) -> Self {
        let creds = Credentials::new(
            config.secret_id.clone(),
            config.secret_key.clone(),
            None,
            None,
            "cos",
        );
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(creds)
            .endpoint_url(format!("https://cos.{}.myqcloud.com", config.region))
            .region(Region::new(config.region.clone()))
            .force_path_style(false)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();
        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_url: public_base_url(config),
        }
    }
}

/// `https://{bucket}.cos.{region}.myqcloud.com` unless a CDN domain is configured.
pub fn public_base_url(config: &CosConfig) -> String {
    config
        .public_url
        .as_deref()
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| format!("https://{}.cos.{}.myqcloud.com", config.bucket, config.region))
}

#[async_trait]
impl StorageService for CosStorageService {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .cache_control("public, max-age=31536000, immutable")
            .send()
            .await?;
        Ok(self.get_url(key))
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    fn get_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}
