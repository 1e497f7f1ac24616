use std::time::Duration;

/// Shared outbound client for the vision API, WeChat and Qiniu.
pub fn build_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("hairstyle-api/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
