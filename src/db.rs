use sqlx::{MySqlPool, mysql::MySqlPoolOptions};
use tracing::info;

/// Connects and brings the schema up to date with `migrations/`.
pub async fn init_db(database_url: &str) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database connected and migrated");

    Ok(pool)
}
