mod session;

use log::info;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use sqlx::migrate::{MigrateError, Migrator};

use crate::config::{ConfigError, DbDriver, Settings};

pub use session::DbSession;

static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");
static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");

#[derive(Debug, thiserror::Error)]
pub enum DbSetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to connect to the database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Failed to run migrations: {0}")]
    Migrate(#[from] MigrateError),
}

#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    driver: DbDriver,
}

impl Database {
    pub async fn connect(settings: &Settings) -> Result<Self, DbSetupError> {
        sqlx::any::install_default_drivers();

        let url = settings.database_url()?;
        let pool = AnyPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .connect(&url)
            .await?;

        info!("Connected to {:?} database", settings.db_driver);
        Ok(Database {
            pool,
            driver: settings.db_driver,
        })
    }

    /// Single-connection in-memory SQLite database with the schema applied.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, DbSetupError> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Database {
            pool,
            driver: DbDriver::Sqlite,
        };
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<(), DbSetupError> {
        let migrator = match self.driver {
            DbDriver::Sqlite => &SQLITE_MIGRATOR,
            DbDriver::Postgres => &POSTGRES_MIGRATOR,
        };
        migrator.run(&self.pool).await?;
        info!("Database migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}
