//! Wine image metadata and blob storage operations
//!
//! `wine_images` holds references only; the payload lives either on the
//! filesystem or in `image_blobs`, depending on the active image store
//! backend.

use crate::db::models::WineImage;
use crate::{Error, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

fn image_from_row(row: &SqliteRow) -> Result<WineImage> {
    let guid: String = row.get("guid");
    let wine_id: String = row.get("wine_id");
    Ok(WineImage {
        id: Uuid::parse_str(&guid)
            .map_err(|e| Error::Internal(format!("Malformed guid in database: {e}")))?,
        wine_id: Uuid::parse_str(&wine_id)
            .map_err(|e| Error::Internal(format!("Malformed guid in database: {e}")))?,
        image_ref: row.get("image_ref"),
        display_order: row.get("display_order"),
    })
}

/// Attach an image reference to a wine, appending at the end of the order
pub async fn insert_image(pool: &SqlitePool, wine_id: Uuid, image_ref: &str) -> Result<WineImage> {
    let next_order: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(display_order) + 1, 0) FROM wine_images WHERE wine_id = ?",
    )
    .bind(wine_id.to_string())
    .fetch_one(pool)
    .await?;

    let image = WineImage {
        id: Uuid::new_v4(),
        wine_id,
        image_ref: image_ref.to_string(),
        display_order: next_order,
    };

    sqlx::query(
        r#"
        INSERT INTO wine_images (guid, wine_id, image_ref, display_order, created_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(image.id.to_string())
    .bind(image.wine_id.to_string())
    .bind(&image.image_ref)
    .bind(image.display_order)
    .execute(pool)
    .await?;

    Ok(image)
}

/// Load a single image row by id
pub async fn load_image(pool: &SqlitePool, id: Uuid) -> Result<Option<WineImage>> {
    let row = sqlx::query(
        "SELECT guid, wine_id, image_ref, display_order FROM wine_images WHERE guid = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(image_from_row).transpose()
}

/// Images for one wine in display order
pub async fn list_for_wine(pool: &SqlitePool, wine_id: Uuid) -> Result<Vec<WineImage>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, wine_id, image_ref, display_order
        FROM wine_images
        WHERE wine_id = ?
        ORDER BY display_order ASC
        "#,
    )
    .bind(wine_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(image_from_row).collect()
}

/// Remove one image row, returning its ref for backend cleanup
pub async fn delete_image(pool: &SqlitePool, id: Uuid) -> Result<String> {
    let image_ref: Option<String> =
        sqlx::query_scalar("SELECT image_ref FROM wine_images WHERE guid = ?")
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;
    let image_ref = image_ref.ok_or_else(|| Error::NotFound(format!("Wine image {id}")))?;

    sqlx::query("DELETE FROM wine_images WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(image_ref)
}

/// Remove all image rows for a wine, returning their refs for cleanup
pub async fn delete_all_for_wine(pool: &SqlitePool, wine_id: Uuid) -> Result<Vec<String>> {
    let refs: Vec<String> =
        sqlx::query_scalar("SELECT image_ref FROM wine_images WHERE wine_id = ?")
            .bind(wine_id.to_string())
            .fetch_all(pool)
            .await?;

    sqlx::query("DELETE FROM wine_images WHERE wine_id = ?")
        .bind(wine_id.to_string())
        .execute(pool)
        .await?;

    Ok(refs)
}

// Blob accessors for the in-database image store backend

pub async fn put_blob(pool: &SqlitePool, blob_key: &str, data: &[u8]) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO image_blobs (blob_key, data, created_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(blob_key) DO UPDATE SET data = excluded.data
        "#,
    )
    .bind(blob_key)
    .bind(data)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_blob(pool: &SqlitePool, blob_key: &str) -> Result<Vec<u8>> {
    let data: Option<Vec<u8>> = sqlx::query_scalar("SELECT data FROM image_blobs WHERE blob_key = ?")
        .bind(blob_key)
        .fetch_optional(pool)
        .await?;

    data.ok_or_else(|| Error::NotFound(format!("Image blob {blob_key}")))
}

pub async fn delete_blob(pool: &SqlitePool, blob_key: &str) -> Result<()> {
    sqlx::query("DELETE FROM image_blobs WHERE blob_key = ?")
        .bind(blob_key)
        .execute(pool)
        .await?;

    Ok(())
}
