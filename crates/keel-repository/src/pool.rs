//! Database connection pool management.

use crate::{SqlDialect, SqlSession};
use async_trait::async_trait;
use keel_config::DatabaseConfig;
use keel_core::{Interface, KeelResult};
use shaku::Component;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tracing::{info, warn};

/// Interface for database pool operations.
///
/// This trait abstracts database pool functionality for dependency injection.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    /// Returns a reference to the underlying pool.
    fn inner(&self) -> &AnyPool;

    /// Returns the SQL dialect of the connected database.
    fn dialect(&self) -> SqlDialect;

    /// Begins a new unit of work.
    async fn begin(&self) -> KeelResult<SqlSession>;

    /// Checks if the database connection is healthy.
    async fn health_check(&self) -> KeelResult<()>;

    /// Closes the database pool.
    async fn close(&self);
}

/// Database pool wrapper.
#[derive(Component)]
#[shaku(interface = DatabasePoolInterface)]
pub struct DatabasePool {
    pool: AnyPool,
    dialect: SqlDialect,
    log_queries: bool,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    ///
    /// Alias: [`connect`](Self::connect)
    pub async fn new(config: &DatabaseConfig) -> KeelResult<Self> {
        let dialect = SqlDialect::from_url(&config.url)?;
        sqlx::any::install_default_drivers();

        info!(%dialect, "Connecting to database...");

        let pool = AnyPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                e
            })?;

        info!(%dialect, "Database connection pool established");
        Ok(Self {
            pool,
            dialect,
            log_queries: config.log_queries,
        })
    }

    /// Creates a new database pool from configuration.
    ///
    /// This is an alias for [`new`](Self::new).
    pub async fn connect(config: &DatabaseConfig) -> KeelResult<Self> {
        Self::new(config).await
    }

    /// Creates DatabasePool with a pre-existing pool (for Shaku injection).
    #[must_use]
    pub fn with_pool(pool: AnyPool, dialect: SqlDialect) -> Self {
        Self {
            pool,
            dialect,
            log_queries: false,
        }
    }

    /// Returns the component parameters for registering this pool in a
    /// shaku module.
    #[must_use]
    pub fn parameters(&self) -> DatabasePoolParameters {
        DatabasePoolParameters {
            pool: self.pool.clone(),
            dialect: self.dialect,
            log_queries: self.log_queries,
        }
    }
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn inner(&self) -> &AnyPool {
        &self.pool
    }

    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    async fn begin(&self) -> KeelResult<SqlSession> {
        let tx = self.pool.begin().await?;
        Ok(SqlSession::new(tx, self.dialect, self.log_queries))
    }

    async fn health_check(&self) -> KeelResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("dialect", &self.dialect)
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

/// Creates a shared database pool.
pub async fn create_pool(config: &DatabaseConfig) -> KeelResult<std::sync::Arc<DatabasePool>> {
    let pool = DatabasePool::new(config).await?;
    Ok(std::sync::Arc::new(pool))
}
