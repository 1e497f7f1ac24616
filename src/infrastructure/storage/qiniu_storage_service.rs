use super::traits::StorageService;
use crate::config::QiniuConfig;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use hmac::{Hmac, Mac};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use tracing::debug;

type HmacSha1 = Hmac<Sha1>;

const RS_HOST: &str = "https://rs.qiniuapi.com";
const UPLOAD_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Serialize)]
struct PutPolicy {
    scope: String,
    deadline: i64,
}

#[derive(Deserialize)]
struct UploadError {
    error: Option<String>,
}

fn sign(secret_key: &str, data: &[u8]) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC-SHA1 accepts keys of any length");
    mac.update(data);
    URL_SAFE.encode(mac.finalize().into_bytes())
}

/// Upload token scoped to exactly one key: `ak:sign(encoded_policy):encoded_policy`.
pub fn upload_token(access_key: &str, secret_key: &str, bucket: &str, key: &str, deadline: i64) -> String {
    let policy = PutPolicy {
        scope: format!("{}:{}", bucket, key),
        deadline,
    };
    // A two-field struct of String and i64 always serializes.
    let policy_json = serde_json::to_vec(&policy).unwrap_or_default();
    let encoded_policy = URL_SAFE.encode(policy_json);
    format!(
        "{}:{}:{}",
        access_key,
        sign(secret_key, encoded_policy.as_bytes()),
        encoded_policy
    )
}

/// `QBox` management credential for a body-less request to `path`.
pub fn management_authorization(access_key: &str, secret_key: &str, path: &str) -> String {
    format!(
        "QBox {}:{}",
        access_key,
        sign(secret_key, format!("{}\n", path).as_bytes())
    )
}

pub fn delete_path(bucket: &str, key: &str) -> String {
    format!("/delete/{}", URL_SAFE.encode(format!("{}:{}", bucket, key)))
}

/// Qiniu Kodo via form upload and the `rs` management API.
pub struct QiniuStorageService {
    http: reqwest::Client,
    access_key: String,
    secret_key: String,
    bucket: String,
    domain: String,
    upload_url: String,
}

impl QiniuStorageService {
    pub fn new(http: reqwest::Client, config: &QiniuConfig) -> Self {
        Self {
            http,
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            bucket: config.bucket.clone(),
            domain: config.domain.trim_end_matches('/').to_string(),
            upload_url: config.upload_url.clone(),
        }
    }
}

#[async_trait]
impl StorageService for QiniuStorageService {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
        let deadline = chrono::Utc::now().timestamp() + UPLOAD_TOKEN_TTL_SECS;
        let token = upload_token(&self.access_key, &self.secret_key, &self.bucket, key, deadline);

        let file = Part::bytes(data)
            .file_name(key.to_string())
            .mime_str(content_type)?;
        let form = Form::new()
            .text("token", token)
            .text("key", key.to_string())
            .part("file", file);

        let response = self.http.post(&self.upload_url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let reason = serde_json::from_slice::<UploadError>(&body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            anyhow::bail!("Qiniu upload failed with status {}: {}", status, reason);
        }
        debug!(key, "Uploaded object to Qiniu");
        Ok(self.get_url(key))
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = delete_path(&self.bucket, key);
        let response = self
            .http
            .post(format!("{}{}", RS_HOST, path))
            .header(
                reqwest::header::AUTHORIZATION,
                management_authorization(&self.access_key, &self.secret_key, &path),
            )
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("Qiniu delete failed with status {}", response.status());
        }
        Ok(())
    }

    fn get_url(&self, key: &str) -> String {
        format!("{}/{}", self.domain, key)
    }
}
