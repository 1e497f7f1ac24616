//! Application configuration loading from environment variables.
//!
//! All configuration is loaded from the environment at startup via `std::env::var`,
//! after `dotenvy` has merged an optional `.env` file.
//!
//! # Environment Variables
//!
//! ## Required Variables
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `VOLCENGINE_ACCESS_KEY_ID`: Volcengine visual API access key
//! - `VOLCENGINE_SECRET_ACCESS_KEY`: Volcengine visual API secret key
//! - `WX_APP_ID`: WeChat mini-program app id
//! - `WX_APP_SECRET`: WeChat mini-program app secret
//! - `JWT_SECRET`: Secret key for session token signing
//!
//! ## Storage Variables
//! - `STORAGE_PROVIDER`: `cos` (default) or `qiniu`
//! - `COS_SECRET_ID`, `COS_SECRET_KEY`, `COS_BUCKET`, `COS_REGION`: required for `cos`
//! - `COS_PUBLIC_URL`: public base URL (default: `https://{bucket}.cos.{region}.myqcloud.com`)
//! - `QINIU_ACCESS_KEY`, `QINIU_SECRET_KEY`, `QINIU_BUCKET`, `QINIU_DOMAIN`: required for `qiniu`
//! - `QINIU_UPLOAD_URL`: form upload host (default: `https://upload.qiniup.com`)
//!
//! ## Optional Variables
//! - `RUST_LOG`: Logging level (default: "info,hairstyle_api=debug,tower_http=debug")
//! - `LOG_FORMAT`: `pretty` (default) or `json`
//! - `HOST`: Server bind address (default: "0.0.0.0")
//! - `PORT`: Server port (default: 8080)
//! - `DATABASE_MAX_CONNECTIONS`: DB pool size (default: 10)
//! - `REDIS_URL`: Redis URL for rate limiting (unset disables rate limiting)
//! - `RATE_LIMIT_GENERATIONS_PER_IP`: Generations per IP per day (default: 200, 0 disables)
//! - `VOLCENGINE_ENDPOINT`: Visual API endpoint (default: "https://visual.volcengineapi.com")
//! - `VOLCENGINE_REGION`: Signing region (default: "cn-north-1")
//! - `VOLCENGINE_SERVICE`: Signing service (default: "cv")
//! - `VOLCENGINE_REQ_KEY`: Model key (default: "byteedit_v2.0")
//! - `WX_API_BASE`: WeChat API base URL (default: "https://api.weixin.qq.com")
//! - `JWT_EXPIRE_HOURS`: Session token lifetime (default: 168)
//! - `REQUIRE_AUTH`: Require a bearer token on user routes (default: false)
//! - `SIGN_IN_UTC_OFFSET_HOURS`: Offset defining the sign-in calendar day (default: 8)
//! - `DEFAULT_AVATAR_URL`: Avatar shown for users without one
//! - `HTTP_TIMEOUT_SECONDS`: Outbound HTTP timeout (default: 60)
//! - `GENERATION_COST`, `SIGN_IN_REWARD`, `INVITE_REWARD`, `INITIAL_COIN`: coin amounts
//!   (defaults: 20, 20, 20, 60)
//! - `IGNORE_MISSING_MIGRATIONS`: Skip missing migrations (default: true)

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Which object storage backend holds generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Cos,
    Qiniu,
}

impl FromStr for StorageProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cos" => Ok(Self::Cos),
            "qiniu" => Ok(Self::Qiniu),
            other => Err(format!("unknown storage provider '{}'", other)),
        }
    }
}

impl fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cos => write!(f, "cos"),
            Self::Qiniu => write!(f, "qiniu"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Tencent COS credentials and bucket location.
#[derive(Debug, Clone, Deserialize)]
pub struct CosConfig {
    pub secret_id: String,
    pub secret_key: String,
    /// Bucket name including the app id suffix (e.g. `hairstyle-1250000000`)
    pub bucket: String,
    /// COS region (e.g. `ap-guangzhou`)
    pub region: String,
    pub public_url: Option<String>,
}

/// Qiniu Kodo credentials and bucket location.
#[derive(Debug, Clone, Deserialize)]
pub struct QiniuConfig {
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Public download domain including scheme (e.g. `https://img.example.com`)
    pub domain: String,
    pub upload_url: String,
}

/// Complete server configuration loaded from environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of concurrent database connections
    pub database_max_connections: u32,

    /// Redis URL backing the generation rate limiter
    pub redis_url: Option<String>,

    /// Rate limit: maximum generations per IP address per day
    pub rate_limit_generations_per_ip: u32,

    pub volcengine_access_key_id: String,
    pub volcengine_secret_access_key: String,
    pub volcengine_endpoint: String,
    pub volcengine_region: String,
    pub volcengine_service: String,
    pub volcengine_req_key: String,

    pub wx_app_id: String,
    pub wx_app_secret: String,
    pub wx_api_base: String,

    pub storage_provider: StorageProvider,
    pub cos: Option<CosConfig>,
    pub qiniu: Option<QiniuConfig>,

    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Secret key for session token signing and verification
    pub jwt_secret: String,
    pub jwt_expire_hours: i64,

    /// Reject user routes that carry no bearer token
    pub require_auth: bool,

    /// UTC offset in hours used to decide what "today" means for sign-in
    pub sign_in_utc_offset_hours: i32,

    pub default_avatar_url: String,

    pub http_timeout_seconds: u64,

    pub generation_cost: i32,
    pub sign_in_reward: i32,
    pub invite_reward: i32,
    pub initial_coin: i32,

    pub log_format: LogFormat,

    /// Skip missing migrations during startup
    pub ignore_missing_migrations: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required environment variable is missing or
    /// cannot be parsed, including the credentials of the selected storage provider.
    pub fn from_env() -> anyhow::Result<Self> {
        let storage_provider: StorageProvider = env_or("STORAGE_PROVIDER", StorageProvider::Cos)?;

        let cos = match storage_provider {
            StorageProvider::Cos => Some(CosConfig {
                secret_id: env_required("COS_SECRET_ID")?,
                secret_key: env_required("COS_SECRET_KEY")?,
                bucket: env_required("COS_BUCKET")?,
                region: env_required("COS_REGION")?,
                public_url: env_optional("COS_PUBLIC_URL"),
            }),
            StorageProvider::Qiniu => None,
        };

        let qiniu = match storage_provider {
            StorageProvider::Qiniu => Some(QiniuConfig {
                access_key: env_required("QINIU_ACCESS_KEY")?,
                secret_key: env_required("QINIU_SECRET_KEY")?,
                bucket: env_required("QINIU_BUCKET")?,
                domain: env_required("QINIU_DOMAIN")?,
                upload_url: env_or("QINIU_UPLOAD_URL", "https://upload.qiniup.com".to_string())?,
            }),
            StorageProvider::Cos => None,
        };

        Ok(Self {
            database_url: env_required("DATABASE_URL")?,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            redis_url: env_optional("REDIS_URL"),
            rate_limit_generations_per_ip: env_or("RATE_LIMIT_GENERATIONS_PER_IP", 200)?,
            volcengine_access_key_id: env_required("VOLCENGINE_ACCESS_KEY_ID")?,
            volcengine_secret_access_key: env_required("VOLCENGINE_SECRET_ACCESS_KEY")?,
            volcengine_endpoint: env_or(
                "VOLCENGINE_ENDPOINT",
                "https://visual.volcengineapi.com".to_string(),
            )?,
            volcengine_region: env_or("VOLCENGINE_REGION", "cn-north-1".to_string())?,
            volcengine_service: env_or("VOLCENGINE_SERVICE", "cv".to_string())?,
            volcengine_req_key: env_or("VOLCENGINE_REQ_KEY", "byteedit_v2.0".to_string())?,
            wx_app_id: env_required("WX_APP_ID")?,
            wx_app_secret: env_required("WX_APP_SECRET")?,
            wx_api_base: env_or("WX_API_BASE", "https://api.weixin.qq.com".to_string())?,
            storage_provider,
            cos,
            qiniu,
            host: env_or("HOST", "0.0.0.0".to_string())?,
            port: env_or("PORT", 8080)?,
            jwt_secret: env_required("JWT_SECRET")?,
            jwt_expire_hours: env_or("JWT_EXPIRE_HOURS", 168)?,
            require_auth: env_or("REQUIRE_AUTH", false)?,
            sign_in_utc_offset_hours: utc_offset_hours("SIGN_IN_UTC_OFFSET_HOURS", 8)?,
            default_avatar_url: env_or(
                "DEFAULT_AVATAR_URL",
                "https://hairstyle-1255379329.cos.ap-guangzhou.myqcloud.com/avatar.png".to_string(),
            )?,
            http_timeout_seconds: env_or("HTTP_TIMEOUT_SECONDS", 60)?,
            generation_cost: env_or("GENERATION_COST", 20)?,
            sign_in_reward: env_or("SIGN_IN_REWARD", 20)?,
            invite_reward: env_or("INVITE_REWARD", 20)?,
            initial_coin: env_or("INITIAL_COIN", 60)?,
            log_format: env_or("LOG_FORMAT", LogFormat::Pretty)?,
            ignore_missing_migrations: env_or("IGNORE_MISSING_MIGRATIONS", true)?,
        })
    }
}

/// Load a required environment variable.
///
/// # Errors
///
/// Returns an error if the variable is not set or is blank.
fn env_required(key: &str) -> anyhow::Result<String> {
    env_optional(key).ok_or_else(|| anyhow::anyhow!("Missing required environment variable: {}", key))
}

fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Load an environment variable with a default value.
///
/// # Errors
///
/// Returns an error if the variable is set but cannot be parsed.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

/// Load a whole-hour UTC offset, rejecting values outside `-23..=23`.
fn utc_offset_hours(key: &str, default: i32) -> anyhow::Result<i32> {
    check_utc_offset_hours(key, env_or(key, default)?)
}

fn check_utc_offset_hours(key: &str, hours: i32) -> anyhow::Result<i32> {
    if (-23..=23).contains(&hours) {
        Ok(hours)
    } else {
        Err(anyhow::anyhow!(
            "{} must be between -23 and 23 hours, got {}",
            key,
            hours
        ))
    }
}
