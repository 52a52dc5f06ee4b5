use super::{MemoryStore, PostgresStore, SharedStore};
use crate::config::Config;
use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}

/// Builds the record store for this process: Postgres when a URL is
/// configured, otherwise the in-memory store (development only).
pub async fn open_store(config: &Config) -> AppResult<SharedStore> {
    if config.database.url.trim().is_empty() {
        if config.is_production() {
            return Err(AppError::ConfigError(
                "DATABASE_URL is required in production".to_string(),
            ));
        }
        log::warn!("No DATABASE_URL configured, using the in-memory record store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;
    log::info!("Connected to database, migrations applied");
    Ok(Arc::new(PostgresStore::new(pool)))
}
