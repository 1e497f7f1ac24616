use hairstyle_api::{
    config::{Config, LogFormat, StorageProvider},
    infrastructure::{
        database::pool::{create_pool, run_migrations},
        http_client::build_http_client,
        repositories::{
            sqlx_record_repository::SqlxRecordRepository,
            sqlx_square_repository::SqlxSquareRepository,
            sqlx_user_repository::SqlxUserRepository,
        },
        storage::{
            cos_storage_service::CosStorageService, mirror::HttpImageMirror,
            qiniu_storage_service::QiniuStorageService, traits::StorageService,
        },
        vision::{signer::Signer, volcengine_client::VolcengineClient},
        wechat::client::WechatClient,
    },
    presentation::http::{routes::create_router, state::AppState},
};
use axum::extract::DefaultBodyLimit;
use http::{HeaderValue, Method, header};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

const MAX_BODY_BYTES: usize = 15 * 1024 * 1024;

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| {
            tracing_subscriber::EnvFilter::try_new("info,hairstyle_api=debug,tower_http=debug")
        })
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_current_span(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(env_filter).init(),
    }
}

fn build_storage(config: &Config, http: reqwest::Client) -> anyhow::Result<Arc<dyn StorageService>> {
    let storage: Arc<dyn StorageService> = match config.storage_provider {
        StorageProvider::Cos => {
            let cos = config
                .cos
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("COS storage selected but not configured"))?;
            Arc::new(CosStorageService::new(cos))
        }
        StorageProvider::Qiniu => {
            let qiniu = config
                .qiniu
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("Qiniu storage selected but not configured"))?;
            Arc::new(QiniuStorageService::new(http, qiniu))
        }
    };
    tracing::info!(provider = ?config.storage_provider, "object storage ready");
    Ok(storage)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let db = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&db, config.ignore_missing_migrations).await?;

    let redis = match config.redis_url.as_deref() {
        Some(url) => Some(redis::Client::open(url)?),
        None => {
            tracing::warn!("REDIS_URL not set, generation rate limiting disabled");
            None
        }
    };

    let http_client = build_http_client(config.http_timeout_seconds)?;
    let storage = build_storage(&config, http_client.clone())?;

    let signer = Signer::new(
        config.volcengine_access_key_id.clone(),
        config.volcengine_secret_access_key.clone(),
        config.volcengine_region.clone(),
        config.volcengine_service.clone(),
    );
    let generator = VolcengineClient::new(
        http_client.clone(),
        &config.volcengine_endpoint,
        signer,
        config.volcengine_req_key.clone(),
    )?;
    let wechat = WechatClient::new(
        http_client.clone(),
        config.wx_api_base.clone(),
        config.wx_app_id.clone(),
        config.wx_app_secret.clone(),
    );

    let state = AppState {
        db: db.clone(),
        redis,
        config: config.clone(),
        user_repo: Arc::new(SqlxUserRepository::new(db.clone())),
        record_repo: Arc::new(SqlxRecordRepository::new(db.clone())),
        square_repo: Arc::new(SqlxSquareRepository::new(db.clone())),
        generator: Arc::new(generator),
        mirror: Arc::new(HttpImageMirror::new(http_client, storage)),
        wechat: Arc::new(wechat),
    };

    // Mini-program clients send no Origin header.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let app = create_router(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("hairstyle API listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, shutting down");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, shutting down");
        }
    }
}
