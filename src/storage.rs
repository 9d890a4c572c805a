use anyhow::Context;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Row, Sqlite, SqlitePool};
use tauri::AppHandle;
use tauri::Manager;

use crate::config;

// The only thing this app persists is configuration. The transcript is
// session state and never touches disk.
const MIGRATIONS_SQL: &str = "
-- Application Settings Table (Key-Value)
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
";

#[derive(Debug)]
pub struct StorageManager {
    pool: SqlitePool,
}

impl StorageManager {
    /// Creates a new StorageManager, connects to the database, and runs migrations.
    pub async fn new(app_handle: &AppHandle) -> Result<Self, anyhow::Error> {
        let db_path = app_handle
            .path()
            .resolve("appdraft.sqlite", tauri::path::BaseDirectory::AppLocalData)
            .context("Failed to resolve database path")?;

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        log::info!("Connecting to database: {}", db_url);

        // Create the database file if it doesn't exist
        if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
            log::info!("Database file not found, creating...");
            Sqlite::create_database(&db_url)
                .await
                .context("Failed to create database")?;
        }

        Self::connect(&db_url).await
    }

    /// Connects to an existing database URL and runs migrations. Split out
    /// of `new` so tests can point it at `sqlite::memory:`.
    pub async fn connect(db_url: &str) -> Result<Self, anyhow::Error> {
        // A single connection is plenty for one settings row, and keeps an
        // in-memory database coherent (each sqlite::memory: connection is
        // its own database).
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Applies the database schema migrations.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), anyhow::Error> {
        log::info!("Running database migrations...");
        sqlx::query(MIGRATIONS_SQL)
            .execute(pool)
            .await
            .context("Failed to run database migrations")?;
        log::info!("Database migrations completed.");
        Ok(())
    }

    /// Reads a settings value, None if the key has never been written.
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to read setting")?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    /// Upserts a settings value. Writing the same value twice is fine and
    /// leaves the row unchanged.
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .context("Failed to write setting")?;
        Ok(())
    }

    /// The configured LLM endpoint, falling back to the built-in default
    /// when nothing has been saved yet.
    pub async fn load_endpoint(&self) -> Result<String, anyhow::Error> {
        Ok(self
            .get_setting(config::ENDPOINT_SETTING_KEY)
            .await?
            .unwrap_or_else(|| config::DEFAULT_ENDPOINT.to_string()))
    }

    /// Persists an already-validated endpoint URL.
    pub async fn save_endpoint(&self, url: &str) -> Result<(), anyhow::Error> {
        self.set_setting(config::ENDPOINT_SETTING_KEY, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_storage() -> StorageManager {
        StorageManager::connect("sqlite::memory:")
            .await
            .expect("in-memory database")
    }

    #[tokio::test]
    async fn missing_setting_reads_as_none() {
        let storage = memory_storage().await;
        assert_eq!(storage.get_setting("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn endpoint_defaults_until_saved() {
        let storage = memory_storage().await;
        assert_eq!(storage.load_endpoint().await.unwrap(), config::DEFAULT_ENDPOINT);

        storage
            .save_endpoint("http://localhost:8080/v1/chat/completions")
            .await
            .unwrap();
        assert_eq!(
            storage.load_endpoint().await.unwrap(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn saving_twice_is_idempotent() {
        let storage = memory_storage().await;
        storage.save_endpoint("http://10.0.0.2:5000/v1/chat/completions").await.unwrap();
        storage.save_endpoint("http://10.0.0.2:5000/v1/chat/completions").await.unwrap();
        assert_eq!(
            storage.load_endpoint().await.unwrap(),
            "http://10.0.0.2:5000/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn set_setting_overwrites() {
        let storage = memory_storage().await;
        storage.set_setting("k", "a").await.unwrap();
        storage.set_setting("k", "b").await.unwrap();
        assert_eq!(storage.get_setting("k").await.unwrap().as_deref(), Some("b"));
    }
}
