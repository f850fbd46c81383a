//! Database initialization
//!
//! Creates the database file on first run and brings the schema up
//! idempotently. Safe to call on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{info, warn};

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL keeps reads from blocking the single writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent). Exposed so tests can run it against an
/// in-memory pool.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_cellars_table(pool).await?;
    create_wines_table(pool).await?;
    create_wine_images_table(pool).await?;
    create_image_blobs_table(pool).await?;
    create_tasting_notes_table(pool).await?;
    create_drinking_records_table(pool).await?;
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

/// Create the cellars table
///
/// Grid bounds carry the same UI-imposed limits the forms enforce.
pub async fn create_cellars_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cellars (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            notes TEXT,
            rows INTEGER NOT NULL,
            columns INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (rows >= 1 AND rows <= 20),
            CHECK (columns >= 1 AND columns <= 30)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the wines table
///
/// Placement is three nullable columns; occupancy uniqueness is enforced by
/// the collision validator at write time, not by a constraint here.
pub async fn create_wines_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wines (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            producer TEXT NOT NULL,
            vintage INTEGER,
            wine_type TEXT NOT NULL CHECK (wine_type IN ('red', 'white', 'rose', 'sparkling', 'dessert', 'fortified')),
            country TEXT NOT NULL,
            region TEXT,
            grape_varieties TEXT,
            quantity INTEGER NOT NULL DEFAULT 0,
            purchase_price REAL,
            purchase_date TEXT,
            purchase_location TEXT,
            bottle_size TEXT,
            alcohol_content REAL,
            drink_from INTEGER,
            drink_to INTEGER,
            notes TEXT,
            cellar_id TEXT REFERENCES cellars(guid),
            position_row INTEGER,
            position_column INTEGER,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (quantity >= 0),
            CHECK (position_row IS NULL OR position_row >= 0),
            CHECK (position_column IS NULL OR position_column >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_wines_cellar ON wines(cellar_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_wines_position ON wines(cellar_id, position_row, position_column)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_wine_images_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wine_images (
            guid TEXT PRIMARY KEY,
            wine_id TEXT NOT NULL REFERENCES wines(guid) ON DELETE CASCADE,
            image_ref TEXT NOT NULL,
            display_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (display_order >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_wine_images_wine ON wine_images(wine_id, display_order)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Payload table for the in-database image store backend
async fn create_image_blobs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS image_blobs (
            blob_key TEXT PRIMARY KEY,
            data BLOB NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_tasting_notes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasting_notes (
            guid TEXT PRIMARY KEY,
            wine_id TEXT NOT NULL REFERENCES wines(guid) ON DELETE CASCADE,
            rating INTEGER NOT NULL,
            tasted_at TEXT NOT NULL,
            appearance TEXT,
            aroma TEXT,
            taste TEXT,
            finish TEXT,
            food_pairing TEXT,
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (rating >= 1 AND rating <= 5)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_tasting_notes_wine ON tasting_notes(wine_id, tasted_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_drinking_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS drinking_records (
            guid TEXT PRIMARY KEY,
            wine_id TEXT NOT NULL REFERENCES wines(guid) ON DELETE CASCADE,
            quantity INTEGER NOT NULL,
            drunk_at TEXT NOT NULL,
            occasion TEXT,
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (quantity > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_drinking_records_wine ON drinking_records(wine_id, drunk_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Ensures all required settings exist; NULL values are reset to defaults.
pub async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, "ai_enabled", "false").await?;
    ensure_setting(pool, "openai_api_key", "").await?;
    ensure_setting(pool, "google_cloud_api_key", "").await?;
    ensure_setting(pool, "vivino_api_key", "").await?;
    ensure_setting(pool, "image_store_backend", "filesystem").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
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
        warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
    }

    Ok(())
}
