//! Cellar database operations

use crate::db::models::Cellar;
use crate::position::Bounds;
use crate::{Error, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

fn cellar_from_row(row: &SqliteRow) -> Result<Cellar> {
    let guid: String = row.get("guid");
    let rows: i64 = row.get("rows");
    let columns: i64 = row.get("columns");
    Ok(Cellar {
        id: Uuid::parse_str(&guid)
            .map_err(|e| Error::Internal(format!("Malformed guid in database: {e}")))?,
        name: row.get("name"),
        notes: row.get("notes"),
        rows: rows as u32,
        columns: columns as u32,
    })
}

/// Save a new cellar
pub async fn insert_cellar(pool: &SqlitePool, cellar: &Cellar) -> Result<()> {
    Cellar::validate_bounds(cellar.rows, cellar.columns)?;
    sqlx::query(
        r#"
        INSERT INTO cellars (guid, name, notes, rows, columns, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(cellar.id.to_string())
    .bind(&cellar.name)
    .bind(&cellar.notes)
    .bind(cellar.rows as i64)
    .bind(cellar.columns as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update name and notes. Grid bounds go through [`apply_resize`] so the
/// orphaning pass cannot be skipped.
pub async fn update_cellar_details(
    pool: &SqlitePool,
    id: Uuid,
    name: &str,
    notes: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE cellars SET name = ?, notes = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(name)
    .bind(notes)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Cellar {id}")));
    }
    Ok(())
}

/// Load a single cellar by id
pub async fn load_cellar(pool: &SqlitePool, id: Uuid) -> Result<Option<Cellar>> {
    let row = sqlx::query("SELECT guid, name, notes, rows, columns FROM cellars WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(cellar_from_row).transpose()
}

/// All cellars, newest first
pub async fn list_cellars(pool: &SqlitePool) -> Result<Vec<Cellar>> {
    let rows =
        sqlx::query("SELECT guid, name, notes, rows, columns FROM cellars ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;

    rows.iter().map(cellar_from_row).collect()
}

/// Apply new grid bounds, clearing the placement of every wine in
/// `orphaned` first. One transaction: either the cellar shrinks and the
/// affected wines lose their slots together, or nothing changes.
pub async fn apply_resize(
    pool: &SqlitePool,
    id: Uuid,
    new_bounds: Bounds,
    orphaned: &[Uuid],
) -> Result<()> {
    Cellar::validate_bounds(new_bounds.rows, new_bounds.columns)?;

    let mut tx = pool.begin().await?;

    for wine_id in orphaned {
        sqlx::query(
            r#"
            UPDATE wines SET cellar_id = NULL, position_row = NULL,
                position_column = NULL, updated_at = CURRENT_TIMESTAMP
            WHERE guid = ?
            "#,
        )
        .bind(wine_id.to_string())
        .execute(&mut *tx)
        .await?;
    }

    let result = sqlx::query(
        "UPDATE cellars SET rows = ?, columns = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(new_bounds.rows as i64)
    .bind(new_bounds.columns as i64)
    .bind(id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Cellar {id}")));
    }

    tx.commit().await?;
    Ok(())
}

/// Delete a cellar, clearing the placement of every wine assigned to it in
/// the same transaction.
pub async fn delete_cellar(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE wines SET cellar_id = NULL, position_row = NULL,
            position_column = NULL, updated_at = CURRENT_TIMESTAMP
        WHERE cellar_id = ?
        "#,
    )
    .bind(id.to_string())
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM cellars WHERE guid = ?")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Cellar {id}")));
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::create_schema;
    use crate::db::models::{Wine, WineType};
    use crate::db::wines;
    use crate::position::{shrink_impact, Placement};

    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    fn placed_wine(cellar: Uuid, row: u32, column: u32) -> Wine {
        let mut wine = Wine::new("Test".into(), "Producer".into(), WineType::White, "Italy".into());
        wine.placement = Placement::placed(cellar, row, column);
        wine
    }

    #[tokio::test]
    async fn save_and_load_cellar() {
        let pool = test_pool().await;
        let cellar = Cellar::new("Kitchen rack".into(), 5, 10);
        insert_cellar(&pool, &cellar).await.unwrap();

        let loaded = load_cellar(&pool, cellar.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Kitchen rack");
        assert_eq!(loaded.bounds(), Bounds::new(5, 10));
    }

    #[tokio::test]
    async fn insert_rejects_out_of_range_bounds() {
        let pool = test_pool().await;
        let cellar = Cellar::new("Too big".into(), 25, 10);
        assert!(matches!(
            insert_cellar(&pool, &cellar).await.unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn confirmed_shrink_orphans_out_of_bounds_wines() {
        let pool = test_pool().await;
        let cellar = Cellar::new("Shrinking".into(), 5, 10);
        insert_cellar(&pool, &cellar).await.unwrap();

        let outside = placed_wine(cellar.id, 4, 0);
        let inside = placed_wine(cellar.id, 1, 1);
        wines::insert_wine(&pool, &outside).await.unwrap();
        wines::insert_wine(&pool, &inside).await.unwrap();

        let placed = wines::list_wines_in_cellar(&pool, cellar.id).await.unwrap();
        let new_bounds = Bounds::new(3, 10);
        let affected: Vec<Uuid> = shrink_impact(&placed, new_bounds).iter().map(|w| w.id).collect();
        assert_eq!(affected, vec![outside.id]);

        apply_resize(&pool, cellar.id, new_bounds, &affected).await.unwrap();

        let orphan = wines::load_wine(&pool, outside.id).await.unwrap().unwrap();
        assert_eq!(orphan.placement, Placement::Unplaced);
        let kept = wines::load_wine(&pool, inside.id).await.unwrap().unwrap();
        assert!(kept.placement.is_placed());

        let resized = load_cellar(&pool, cellar.id).await.unwrap().unwrap();
        assert_eq!(resized.bounds(), new_bounds);
    }

    #[tokio::test]
    async fn delete_cellar_unplaces_its_wines() {
        let pool = test_pool().await;
        let cellar = Cellar::new("Doomed".into(), 5, 10);
        insert_cellar(&pool, &cellar).await.unwrap();

        let wine = placed_wine(cellar.id, 0, 0);
        wines::insert_wine(&pool, &wine).await.unwrap();

        delete_cellar(&pool, cellar.id).await.unwrap();

        assert!(load_cellar(&pool, cellar.id).await.unwrap().is_none());
        let survivor = wines::load_wine(&pool, wine.id).await.unwrap().unwrap();
        assert_eq!(survivor.placement, Placement::Unplaced);
    }
}
