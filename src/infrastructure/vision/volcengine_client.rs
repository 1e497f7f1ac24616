use super::signer::{RequestToSign, Signer};
use super::traits::{HairStyleGenerator, ImageSource, VisionError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub const CV_ACTION: &str = "CVProcess";
pub const CV_VERSION: &str = "2022-08-31";
const REQUEST_PATH: &str = "/";

/// Upstream body codes that mean "slow down" even when the HTTP status does not.
const THROTTLE_CODES: [i64; 2] = [50429, 50430];

#[derive(Debug, Deserialize)]
struct CvResponse {
    code: Option<i64>,
    message: Option<String>,
    data: Option<CvData>,
}

#[derive(Debug, Deserialize)]
struct CvData {
    #[serde(default)]
    image_urls: Vec<String>,
}

/// Client for the Volcengine visual `CVProcess` action.
pub struct VolcengineClient {
    http: reqwest::Client,
    signer: Signer,
    endpoint: String,
    host: String,
    req_key: String,
}

impl VolcengineClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: &str,
        signer: Signer,
        req_key: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let url = reqwest::Url::parse(endpoint)?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("vision endpoint has no host: {}", endpoint))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok(Self {
            http,
            signer,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            host,
            req_key: req_key.into(),
        })
    }

    /// JSON body for a restyle request.
    pub fn build_body(&self, source: &ImageSource, prompt: &str) -> serde_json::Value {
        let mut body = json!({
            "req_key": self.req_key,
            "prompt": prompt,
            "return_url": true,
        });
        match source {
            ImageSource::Url(url) => body["image_urls"] = json!([url]),
            ImageSource::Base64(data) => body["binary_data_base64"] = json!([data]),
        }
        body
    }

    fn query() -> Vec<(String, String)> {
        vec![
            ("Action".to_string(), CV_ACTION.to_string()),
            ("Version".to_string(), CV_VERSION.to_string()),
        ]
    }
}

/// Pulls the first result URL out of a `CVProcess` response body.
pub fn extract_image_url(body: &[u8]) -> Result<String, VisionError> {
    let parsed: CvResponse = serde_json::from_slice(body)
        .map_err(|e| VisionError::MissingImage(format!("unparseable response: {}", e)))?;

    if parsed.code.is_some_and(|c| THROTTLE_CODES.contains(&c)) {
        return Err(VisionError::Throttled);
    }

    parsed
        .data
        .and_then(|d| d.image_urls.into_iter().find(|u| !u.trim().is_empty()))
        .ok_or_else(|| {
            VisionError::MissingImage(
                parsed
                    .message
                    .unwrap_or_else(|| "no image_urls in response".to_string()),
            )
        })
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.chars().take(300).collect()
}

#[async_trait]
impl HairStyleGenerator for VolcengineClient {
    #[instrument(skip(self, source, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, source: &ImageSource, prompt: &str) -> Result<String, VisionError> {
        let body = serde_json::to_vec(&self.build_body(source, prompt))
            .map_err(|e| VisionError::MissingImage(format!("request encoding failed: {}", e)))?;
        let query = Self::query();

        let signed = self.signer.sign(
            &RequestToSign {
                method: "POST",
                host: &self.host,
                path: REQUEST_PATH,
                query: &query,
                body: &body,
            },
            chrono::Utc::now(),
        );
        debug!(canonical_request = %signed.canonical_request, "Signed vision request");
        debug!(string_to_sign = %signed.string_to_sign);

        let url = format!("{}{}?{}", self.endpoint, REQUEST_PATH, signed.query_string);
        let mut request = self.http.post(&url).body(body);
        for (name, value) in signed.headers() {
            request = request.header(name, value);
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        info!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Vision API responded"
        );

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Vision API throttled the request");
            return Err(VisionError::Throttled);
        }
        if !status.is_success() {
            return Err(VisionError::Status {
                status: status.as_u16(),
                body: excerpt(&bytes),
            });
        }

        extract_image_url(&bytes)
    }
}
