//! Drinking record database operations
//!
//! Records are append-only. The drink flow itself (record + stock
//! decrement) lives in [`crate::db::wines::record_drink`]; this module
//! covers listing and explicit deletion.

use crate::db::models::DrinkingRecord;
use crate::{Error, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

fn record_from_row(row: &SqliteRow) -> Result<DrinkingRecord> {
    let guid: String = row.get("guid");
    let wine_id: String = row.get("wine_id");
    Ok(DrinkingRecord {
        id: Uuid::parse_str(&guid)
            .map_err(|e| Error::Internal(format!("Malformed guid in database: {e}")))?,
        wine_id: Uuid::parse_str(&wine_id)
            .map_err(|e| Error::Internal(format!("Malformed guid in database: {e}")))?,
        quantity: row.get("quantity"),
        drunk_at: row.get("drunk_at"),
        occasion: row.get("occasion"),
        notes: row.get("notes"),
    })
}

/// Records for one wine, most recent first
pub async fn list_for_wine(pool: &SqlitePool, wine_id: Uuid) -> Result<Vec<DrinkingRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, wine_id, quantity, drunk_at, occasion, notes
        FROM drinking_records
        WHERE wine_id = ?
        ORDER BY drunk_at DESC
        "#,
    )
    .bind(wine_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

pub async fn delete_drinking_record(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM drinking_records WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Drinking record {id}")));
    }
    Ok(())
}
