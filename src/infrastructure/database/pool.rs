use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
    info!(max_connections, "database pool ready");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool, ignore_missing: bool) -> anyhow::Result<()> {
    let mut migrator = sqlx::migrate!("./migrations");
    migrator.set_ignore_missing(ignore_missing);
    migrator.run(pool).await?;
    Ok(())
}
