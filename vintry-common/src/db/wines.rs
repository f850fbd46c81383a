//! Wine database operations
//!
//! Single-record writes throughout; the only multi-statement operations
//! (drink, cascade delete) run inside one transaction so a failure leaves
//! no partial state.

use crate::db::models::{DrinkingRecord, Wine, WineType};
use crate::position::Placement;
use crate::{Error, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

fn parse_guid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Malformed guid in database: {e}")))
}

fn wine_from_row(row: &SqliteRow) -> Result<Wine> {
    let guid: String = row.get("guid");
    let wine_type: String = row.get("wine_type");
    let grape_json: Option<String> = row.get("grape_varieties");
    let cellar_id: Option<String> = row.get("cellar_id");
    let position_row: Option<i64> = row.get("position_row");
    let position_column: Option<i64> = row.get("position_column");

    let cellar_id = cellar_id.as_deref().map(parse_guid).transpose()?;

    Ok(Wine {
        id: parse_guid(&guid)?,
        name: row.get("name"),
        producer: row.get("producer"),
        vintage: row.get("vintage"),
        wine_type: WineType::parse(&wine_type)?,
        country: row.get("country"),
        region: row.get("region"),
        grape_varieties: match grape_json {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| Error::Internal(format!("Malformed grape_varieties JSON: {e}")))?,
            None => Vec::new(),
        },
        quantity: row.get("quantity"),
        purchase_price: row.get("purchase_price"),
        purchase_date: row.get("purchase_date"),
        purchase_location: row.get("purchase_location"),
        bottle_size: row.get("bottle_size"),
        alcohol_content: row.get("alcohol_content"),
        drink_from: row.get("drink_from"),
        drink_to: row.get("drink_to"),
        notes: row.get("notes"),
        placement: Placement::from_columns(
            cellar_id,
            position_row.map(|r| r as u32),
            position_column.map(|c| c as u32),
        ),
    })
}

const SELECT_WINE: &str = r#"
    SELECT guid, name, producer, vintage, wine_type, country, region,
           grape_varieties, quantity, purchase_price, purchase_date,
           purchase_location, bottle_size, alcohol_content, drink_from,
           drink_to, notes, cellar_id, position_row, position_column
    FROM wines
"#;

/// Save a new wine
pub async fn insert_wine(pool: &SqlitePool, wine: &Wine) -> Result<()> {
    let grape_json = serde_json::to_string(&wine.grape_varieties)
        .map_err(|e| Error::Internal(e.to_string()))?;
    sqlx::query(
        r#"
        INSERT INTO wines (
            guid, name, producer, vintage, wine_type, country, region,
            grape_varieties, quantity, purchase_price, purchase_date,
            purchase_location, bottle_size, alcohol_content, drink_from,
            drink_to, notes, cellar_id, position_row, position_column,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(wine.id.to_string())
    .bind(&wine.name)
    .bind(&wine.producer)
    .bind(wine.vintage)
    .bind(wine.wine_type.as_str())
    .bind(&wine.country)
    .bind(&wine.region)
    .bind(grape_json)
    .bind(wine.quantity)
    .bind(wine.purchase_price)
    .bind(&wine.purchase_date)
    .bind(&wine.purchase_location)
    .bind(&wine.bottle_size)
    .bind(wine.alcohol_content)
    .bind(wine.drink_from)
    .bind(wine.drink_to)
    .bind(&wine.notes)
    .bind(wine.placement.cellar_id().map(|id| id.to_string()))
    .bind(wine.placement.slot().map(|s| s.row as i64))
    .bind(wine.placement.slot().map(|s| s.column as i64))
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrite an existing wine's descriptive and placement fields
pub async fn update_wine(pool: &SqlitePool, wine: &Wine) -> Result<()> {
    let grape_json = serde_json::to_string(&wine.grape_varieties)
        .map_err(|e| Error::Internal(e.to_string()))?;
    let result = sqlx::query(
        r#"
        UPDATE wines SET
            name = ?, producer = ?, vintage = ?, wine_type = ?, country = ?,
            region = ?, grape_varieties = ?, quantity = ?, purchase_price = ?,
            purchase_date = ?, purchase_location = ?, bottle_size = ?,
            alcohol_content = ?, drink_from = ?, drink_to = ?, notes = ?,
            cellar_id = ?, position_row = ?, position_column = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&wine.name)
    .bind(&wine.producer)
    .bind(wine.vintage)
    .bind(wine.wine_type.as_str())
    .bind(&wine.country)
    .bind(&wine.region)
    .bind(grape_json)
    .bind(wine.quantity)
    .bind(wine.purchase_price)
    .bind(&wine.purchase_date)
    .bind(&wine.purchase_location)
    .bind(&wine.bottle_size)
    .bind(wine.alcohol_content)
    .bind(wine.drink_from)
    .bind(wine.drink_to)
    .bind(&wine.notes)
    .bind(wine.placement.cellar_id().map(|id| id.to_string()))
    .bind(wine.placement.slot().map(|s| s.row as i64))
    .bind(wine.placement.slot().map(|s| s.column as i64))
    .bind(wine.id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Wine {}", wine.id)));
    }
    Ok(())
}

/// Load a single wine by id
pub async fn load_wine(pool: &SqlitePool, id: Uuid) -> Result<Option<Wine>> {
    let row = sqlx::query(&format!("{SELECT_WINE} WHERE guid = ?"))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(wine_from_row).transpose()
}

/// All wines, newest first
pub async fn list_wines(pool: &SqlitePool) -> Result<Vec<Wine>> {
    let rows = sqlx::query(&format!("{SELECT_WINE} ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await?;

    rows.iter().map(wine_from_row).collect()
}

/// Wines currently assigned to one cellar
pub async fn list_wines_in_cellar(pool: &SqlitePool, cellar_id: Uuid) -> Result<Vec<Wine>> {
    let rows = sqlx::query(&format!("{SELECT_WINE} WHERE cellar_id = ?"))
        .bind(cellar_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter().map(wine_from_row).collect()
}

/// Wine occupying a specific slot, if any
pub async fn wine_at_position(
    pool: &SqlitePool,
    cellar_id: Uuid,
    row: u32,
    column: u32,
) -> Result<Option<Wine>> {
    let found = sqlx::query(&format!(
        "{SELECT_WINE} WHERE cellar_id = ? AND position_row = ? AND position_column = ?"
    ))
    .bind(cellar_id.to_string())
    .bind(row as i64)
    .bind(column as i64)
    .fetch_optional(pool)
    .await?;

    found.as_ref().map(wine_from_row).transpose()
}

/// Relocation executor: overwrite the wine's placement as one record update.
///
/// The caller must re-fetch the cellar's wines afterwards; the position map
/// is re-derived, never patched.
pub async fn update_position(pool: &SqlitePool, wine_id: Uuid, placement: Placement) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE wines SET
            cellar_id = ?, position_row = ?, position_column = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(placement.cellar_id().map(|id| id.to_string()))
    .bind(placement.slot().map(|s| s.row as i64))
    .bind(placement.slot().map(|s| s.column as i64))
    .bind(wine_id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Wine {wine_id}")));
    }
    Ok(())
}

/// Record a consumption event and decrement stock.
///
/// Quantity floors at zero; consuming the last bottle clears the wine's
/// placement so the slot frees up. Record insert and stock update commit
/// together.
pub async fn record_drink(
    pool: &SqlitePool,
    wine_id: Uuid,
    quantity: i64,
    drunk_at: String,
    occasion: Option<String>,
    notes: Option<String>,
) -> Result<Wine> {
    if quantity < 1 {
        return Err(Error::InvalidInput("Drink quantity must be at least 1".into()));
    }

    let mut tx = pool.begin().await?;

    let current: Option<i64> = sqlx::query_scalar("SELECT quantity FROM wines WHERE guid = ?")
        .bind(wine_id.to_string())
        .fetch_optional(&mut *tx)
        .await?;
    let current = current.ok_or_else(|| Error::NotFound(format!("Wine {wine_id}")))?;

    let record = DrinkingRecord {
        id: Uuid::new_v4(),
        wine_id,
        quantity,
        drunk_at,
        occasion,
        notes,
    };
    sqlx::query(
        r#"
        INSERT INTO drinking_records (guid, wine_id, quantity, drunk_at, occasion, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.wine_id.to_string())
    .bind(record.quantity)
    .bind(&record.drunk_at)
    .bind(&record.occasion)
    .bind(&record.notes)
    .execute(&mut *tx)
    .await?;

    let new_quantity = (current - quantity).max(0);
    if new_quantity == 0 {
        sqlx::query(
            r#"
            UPDATE wines SET quantity = 0, cellar_id = NULL, position_row = NULL,
                position_column = NULL, updated_at = CURRENT_TIMESTAMP
            WHERE guid = ?
            "#,
        )
        .bind(wine_id.to_string())
        .execute(&mut *tx)
        .await?;
    } else {
        sqlx::query("UPDATE wines SET quantity = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?")
            .bind(new_quantity)
            .bind(wine_id.to_string())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    load_wine(pool, wine_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Wine {wine_id}")))
}

/// Delete a wine and its child records as one batch.
///
/// Returns the image refs that were attached so the caller can clean up the
/// stored payloads afterwards.
pub async fn delete_wine(pool: &SqlitePool, wine_id: Uuid) -> Result<Vec<String>> {
    let mut tx = pool.begin().await?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM wines WHERE guid = ?)")
        .bind(wine_id.to_string())
        .fetch_one(&mut *tx)
        .await?;
    if !exists {
        return Err(Error::NotFound(format!("Wine {wine_id}")));
    }

    let image_refs: Vec<String> =
        sqlx::query_scalar("SELECT image_ref FROM wine_images WHERE wine_id = ?")
            .bind(wine_id.to_string())
            .fetch_all(&mut *tx)
            .await?;

    sqlx::query("DELETE FROM tasting_notes WHERE wine_id = ?")
        .bind(wine_id.to_string())
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM drinking_records WHERE wine_id = ?")
        .bind(wine_id.to_string())
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM wine_images WHERE wine_id = ?")
        .bind(wine_id.to_string())
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM wines WHERE guid = ?")
        .bind(wine_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(image_refs)
}
