//! Settings database operations
//!
//! Key-value accessors over the settings table. The database is the
//! authoritative store for API credentials and the AI feature toggle.

use crate::{Error, Result};
use sqlx::SqlitePool;
use std::fmt::Display;
use std::str::FromStr;

/// Get a typed setting value; None when unset or empty
pub async fn get_setting<T>(pool: &SqlitePool, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match value.flatten() {
        Some(s) if !s.is_empty() => s
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("Setting '{key}' is malformed: {e}"))),
        _ => Ok(None),
    }
}

/// Set a setting value, creating the row if needed
pub async fn set_setting<T: Display>(pool: &SqlitePool, key: &str, value: T) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Whether the AI collaborators are enabled at all
pub async fn get_ai_enabled(pool: &SqlitePool) -> Result<bool> {
    get_setting(pool, "ai_enabled").await.map(|opt| opt.unwrap_or(false))
}

pub async fn set_ai_enabled(pool: &SqlitePool, enabled: bool) -> Result<()> {
    set_setting(pool, "ai_enabled", enabled).await
}

pub async fn get_openai_api_key(pool: &SqlitePool) -> Result<Option<String>> {
    get_setting(pool, "openai_api_key").await
}

pub async fn set_openai_api_key(pool: &SqlitePool, key: String) -> Result<()> {
    set_setting(pool, "openai_api_key", key).await
}

pub async fn get_google_cloud_api_key(pool: &SqlitePool) -> Result<Option<String>> {
    get_setting(pool, "google_cloud_api_key").await
}

pub async fn set_google_cloud_api_key(pool: &SqlitePool, key: String) -> Result<()> {
    set_setting(pool, "google_cloud_api_key", key).await
}

pub async fn get_vivino_api_key(pool: &SqlitePool) -> Result<Option<String>> {
    get_setting(pool, "vivino_api_key").await
}

pub async fn set_vivino_api_key(pool: &SqlitePool, key: String) -> Result<()> {
    set_setting(pool, "vivino_api_key", key).await
}

/// Which image store backend to use ("filesystem" or "database")
pub async fn get_image_store_backend(pool: &SqlitePool) -> Result<String> {
    get_setting(pool, "image_store_backend")
        .await
        .map(|opt| opt.unwrap_or_else(|| "filesystem".to_string()))
}

pub async fn set_image_store_backend(pool: &SqlitePool, backend: String) -> Result<()> {
    set_setting(pool, "image_store_backend", backend).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::{create_schema, init_default_settings};

    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        init_default_settings(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn ai_is_disabled_by_default() {
        let pool = test_pool().await;
        assert!(!get_ai_enabled(&pool).await.unwrap());
        assert!(get_openai_api_key(&pool).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_and_get_round_trip() {
        let pool = test_pool().await;

        set_ai_enabled(&pool, true).await.unwrap();
        set_openai_api_key(&pool, "sk-test".into()).await.unwrap();

        assert!(get_ai_enabled(&pool).await.unwrap());
        assert_eq!(get_openai_api_key(&pool).await.unwrap().as_deref(), Some("sk-test"));
    }

    #[tokio::test]
    async fn image_backend_defaults_to_filesystem() {
        let pool = test_pool().await;
        assert_eq!(get_image_store_backend(&pool).await.unwrap(), "filesystem");
    }
}
