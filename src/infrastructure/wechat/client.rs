use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Result of exchanging a mini-program login code.
#[derive(Clone, PartialEq, Eq)]
pub struct WechatSession {
    pub openid: String,
    pub session_key: String,
    pub unionid: Option<String>,
}

impl std::fmt::Debug for WechatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatSession")
            .field("openid", &self.openid)
            .field("session_key", &"<redacted>")
            .field("unionid", &self.unionid)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum WechatError {
    #[error("WeChat rejected the login code (errcode {errcode}): {errmsg}")]
    Rejected { errcode: i64, errmsg: String },
    #[error("WeChat response carried no openid")]
    MissingOpenId,
    #[error("WeChat answered HTTP {status} with an unreadable body: {body}")]
    UnexpectedResponse { status: u16, body: String },
    #[error("WeChat request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct Code2SessionResponse {
    openid: Option<String>,
    session_key: Option<String>,
    unionid: Option<String>,
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WechatAuthenticator: Send + Sync {
    async fn code_to_session(&self, code: &str) -> Result<WechatSession, WechatError>;
}

pub struct WechatClient {
    http: reqwest::Client,
    api_base: String,
    app_id: String,
    app_secret: String,
}

impl WechatClient {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    fn session_url(&self, code: &str) -> Result<reqwest::Url, WechatError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/sns/jscode2session", self.api_base),
            &[
                ("appid", self.app_id.as_str()),
                ("secret", self.app_secret.as_str()),
                ("js_code", code),
                ("grant_type", "authorization_code"),
            ],
        )
        .map_err(|e| WechatError::Rejected {
            errcode: -1,
            errmsg: format!("invalid WeChat API base: {}", e),
        })?;
        Ok(url)
    }
}

fn parse_session(status: reqwest::StatusCode, body: &[u8]) -> Result<WechatSession, WechatError> {
    let parsed: Code2SessionResponse =
        serde_json::from_slice(body).map_err(|_| WechatError::UnexpectedResponse {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).chars().take(200).collect(),
        })?;
    if parsed.errcode != 0 {
        return Err(WechatError::Rejected {
            errcode: parsed.errcode,
            errmsg: parsed.errmsg,
        });
    }
    let openid = parsed
        .openid
        .filter(|id| !id.trim().is_empty())
        .ok_or(WechatError::MissingOpenId)?;
    Ok(WechatSession {
        openid,
        session_key: parsed.session_key.unwrap_or_default(),
        unionid: parsed.unionid,
    })
}

#[async_trait]
impl WechatAuthenticator for WechatClient {
    #[instrument(skip(self, code))]
    async fn code_to_session(&self, code: &str) -> Result<WechatSession, WechatError> {
        let url = self.session_url(code)?;
        // WeChat answers with text/plain, so decode the bytes rather than relying on content type.
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        match parse_session(status, &body) {
            Ok(session) => {
                info!(openid = %session.openid, "WeChat code exchanged");
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "WeChat code exchange failed");
                Err(e)
            }
        }
    }
}
