//! Postgres pool and schema migrations for `PgUserStore`

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Connection options for the `[database]` section, tagged with the
/// service name so sessions are identifiable in `pg_stat_activity`.
fn connect_options(database: &DatabaseConfig) -> Result<PgConnectOptions> {
    Ok(PgConnectOptions::from_str(&database.url)?.application_name("authgate"))
}

/// Open the pool described by the `[database]` section.
pub async fn create_pool(database: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(database.min_connections.min(database.max_connections))
        .acquire_timeout(Duration::from_secs(database.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(database.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(database.max_lifetime_secs))
        .test_before_acquire(true)
        .connect_with(connect_options(database)?)
        .await?;

    info!(
        max = database.max_connections,
        min = database.min_connections,
        "Connected to user database"
    );
    Ok(pool)
}

/// Bring the `users` table up to date
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("User schema is current");
    Ok(())
}
