use sqlx::migrate::Migrator;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AppConfig, DatabaseConfig, DemoMode};
use crate::database::fallback::FallbackStore;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::Store;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds connection pools and the store stack from configuration.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Creates a lazily connected pool; nothing is dialled until the first query.
    pub fn pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(url)?;
        info!("Created database pool for {}", Self::redacted(&parsed));
        Ok(pool)
    }

    /// Connects and verifies the database answers.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = Self::pool(config)?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(pool)
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        MIGRATOR.run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Assembles the store used by the API according to `store.demo_mode`.
    pub async fn build_store(config: &AppConfig) -> Result<Arc<FallbackStore>, DatabaseError> {
        let demo: Arc<dyn Store> = Arc::new(MemoryStore::demo());
        let mode = config.store.demo_mode;

        if mode == DemoMode::Always {
            info!("Demo mode forced, the database will not be contacted");
            return Ok(Arc::new(FallbackStore::new(None, demo, mode)));
        }

        let pool = match (&config.database.url, mode) {
            (Some(_), _) => Self::pool(&config.database)?,
            (None, DemoMode::Never) => return Err(DatabaseError::ConfigMissing("DATABASE_URL")),
            (None, _) => {
                warn!("DATABASE_URL not set, serving demo data");
                return Ok(Arc::new(FallbackStore::new(None, demo, mode)));
            }
        };

        if config.database.run_migrations {
            match Self::migrate(&pool).await {
                Ok(()) => {}
                Err(err) if mode == DemoMode::Auto => {
                    warn!(error = %err, "Could not run migrations, continuing in auto mode");
                }
                Err(err) => return Err(err),
            }
        }

        let primary: Arc<dyn Store> = Arc::new(PgStore::new(pool));
        Ok(Arc::new(FallbackStore::new(Some(primary), demo, mode)))
    }

    /// Connection string without credentials, for logs.
    fn redacted(url: &url::Url) -> String {
        let mut safe = url.clone();
        if safe.password().is_some() {
            let _ = safe.set_password(Some("***"));
        }
        safe.to_string()
    }
}
