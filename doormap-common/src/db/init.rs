//! Database initialization
//!
//! Creates the database file and schema on first run so the server starts
//! with zero manual setup. All statements are idempotent and safe to re-run
//! on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_pool(&pool).await?;
    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Initialize an in-memory database (tests)
///
/// Uses a single connection: each in-memory SQLite connection is its own
/// database, so a larger pool would fracture state across connections.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure_pool(&pool).await?;
    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

async fn configure_pool(pool: &SqlitePool) -> Result<()> {
    // Referential integrity between doors and buildings
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers during the door replace transaction
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_buildings_table(pool).await?;
    create_classifications_table(pool).await?;
    create_doors_table(pool).await?;
    create_settings_table(pool).await?;
    Ok(())
}

async fn create_buildings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS buildings (
            id TEXT PRIMARY KEY,
            lat REAL NOT NULL,
            long REAL NOT NULL,
            address TEXT,
            territory_id TEXT,
            last_modified INTEGER NOT NULL,
            CHECK (lat >= -90.0 AND lat <= 90.0),
            CHECK (long >= -180.0 AND long <= 180.0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_buildings_last_modified ON buildings(last_modified)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_doors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doors (
            id TEXT PRIMARY KEY,
            building_id TEXT NOT NULL REFERENCES buildings(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            language_name TEXT NOT NULL,
            info_text TEXT NOT NULL DEFAULT '',
            congregation_id INTEGER NOT NULL DEFAULT 1,
            classification_id TEXT REFERENCES classifications(id),
            CHECK (position >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_doors_building ON doors(building_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_doors_building_position ON doors(building_id, position)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_classifications_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS classifications (
            id TEXT PRIMARY KEY,
            congregation_id INTEGER NOT NULL,
            language_name TEXT NOT NULL,
            color INTEGER,
            image_path TEXT,
            UNIQUE (congregation_id, language_name),
            CHECK (color IS NULL OR (color >= 1 AND color <= 15))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, "default_lat", &crate::config::DEFAULT_LAT.to_string()).await?;
    ensure_setting(pool, "default_long", &crate::config::DEFAULT_LONG.to_string()).await?;
    ensure_setting(
        pool,
        "recent_window_hours",
        &crate::config::DEFAULT_RECENT_WINDOW_HOURS.to_string(),
    )
    .await?;

    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// Creates the setting if absent; resets it to the default if NULL.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // INSERT OR IGNORE handles concurrent initialization races
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Read a setting value, falling back to the supplied default
pub async fn get_setting_or(pool: &SqlitePool, key: &str, default_value: &str) -> Result<String> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?
        .flatten();

    Ok(value.unwrap_or_else(|| default_value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_creates_schema() {
        let pool = init_memory_database().await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buildings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM doors")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_default_settings_seeded() {
        let pool = init_memory_database().await.unwrap();

        let window = get_setting_or(&pool, "recent_window_hours", "0").await.unwrap();
        assert_eq!(window, "24");

        let lat = get_setting_or(&pool, "default_lat", "0").await.unwrap();
        assert_eq!(lat, "11.0168");
    }

    #[tokio::test]
    async fn test_init_database_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("doormap.db");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        // Idempotent: re-running against the existing file succeeds
        drop(pool);
        init_database(&db_path).await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_setting_preserves_existing_value() {
        let pool = init_memory_database().await.unwrap();

        sqlx::query("UPDATE settings SET value = '48' WHERE key = 'recent_window_hours'")
            .execute(&pool)
            .await
            .unwrap();

        ensure_setting(&pool, "recent_window_hours", "24").await.unwrap();

        let window = get_setting_or(&pool, "recent_window_hours", "0").await.unwrap();
        assert_eq!(window, "48");
    }
}
