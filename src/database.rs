use color_eyre::{Result, eyre::Context};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use std::path::Path;
use std::time::Duration;

pub struct Database {
    pub(crate) conn: DatabaseConnection,
}

impl Database {
    /// Open or create a SQLite database file at the given path
    pub async fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening database at: {}", path.display());

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        Self::connect(&format!("sqlite://{}?mode=rwc", path.display())).await
    }

    /// Connect with a full connection string and bring the schema up to date
    pub async fn connect(url: &str) -> Result<Self> {
        let mut opt = ConnectOptions::new(url.to_owned());
        opt.max_connections(16)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .sqlx_logging(false)
            .map_sqlx_sqlite_opts(|opts| opts.foreign_keys(true));

        let conn = SeaDatabase::connect(opt)
            .await
            .wrap_err("Failed to open database")?;

        Self::prepare(conn).await
    }

    /// Single-connection in-memory database, used by tests
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false)
            .map_sqlx_sqlite_opts(|opts| opts.foreign_keys(true));

        let conn = SeaDatabase::connect(opt)
            .await
            .wrap_err("Failed to open in-memory database")?;

        Self::prepare(conn).await
    }

    async fn prepare(conn: DatabaseConnection) -> Result<Self> {
        log::debug!("Running database migrations");
        migration::Migrator::up(&conn, None)
            .await
            .wrap_err("Failed to run database migrations")?;

        log::info!("Database ready");
        Ok(Database { conn })
    }
}
