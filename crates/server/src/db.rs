use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

/// Create a PostgreSQL connection pool and run migrations.
/// Returns None if DATABASE_URL is not configured or unreachable.
pub async fn init_pg_pool(config: &exguard_core::config::PostgresConfig) -> Option<PgPool> {
    let Some(url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not configured, alerts and labels kept in memory");
        return None;
    };

    match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
    {
        Ok(pool) => {
            info!(max_connections = config.max_connections, "PostgreSQL connected");
            match sqlx::migrate!("../../migrations").run(&pool).await {
                Ok(_) => {
                    info!("Database migrations applied successfully");
                    Some(pool)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to run migrations, falling back to in-memory stores");
                    None
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to PostgreSQL, falling back to in-memory stores");
            None
        }
    }
}
