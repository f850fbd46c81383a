//! Tasting note database operations
//!
//! Notes are append-only: created, listed, deleted, never updated.

use crate::db::models::TastingNote;
use crate::{Error, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

fn note_from_row(row: &SqliteRow) -> Result<TastingNote> {
    let guid: String = row.get("guid");
    let wine_id: String = row.get("wine_id");
    Ok(TastingNote {
        id: Uuid::parse_str(&guid)
            .map_err(|e| Error::Internal(format!("Malformed guid in database: {e}")))?,
        wine_id: Uuid::parse_str(&wine_id)
            .map_err(|e| Error::Internal(format!("Malformed guid in database: {e}")))?,
        rating: row.get("rating"),
        tasted_at: row.get("tasted_at"),
        appearance: row.get("appearance"),
        aroma: row.get("aroma"),
        taste: row.get("taste"),
        finish: row.get("finish"),
        food_pairing: row.get("food_pairing"),
        notes: row.get("notes"),
    })
}

pub async fn insert_tasting_note(pool: &SqlitePool, note: &TastingNote) -> Result<()> {
    if !(1..=5).contains(&note.rating) {
        return Err(Error::InvalidInput("Rating must be between 1 and 5".into()));
    }
    sqlx::query(
        r#"
        INSERT INTO tasting_notes (
            guid, wine_id, rating, tasted_at, appearance, aroma, taste,
            finish, food_pairing, notes, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(note.id.to_string())
    .bind(note.wine_id.to_string())
    .bind(note.rating)
    .bind(&note.tasted_at)
    .bind(&note.appearance)
    .bind(&note.aroma)
    .bind(&note.taste)
    .bind(&note.finish)
    .bind(&note.food_pairing)
    .bind(&note.notes)
    .execute(pool)
    .await?;

    Ok(())
}

/// Notes for one wine, most recent tasting first
pub async fn list_for_wine(pool: &SqlitePool, wine_id: Uuid) -> Result<Vec<TastingNote>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, wine_id, rating, tasted_at, appearance, aroma, taste,
               finish, food_pairing, notes
        FROM tasting_notes
        WHERE wine_id = ?
        ORDER BY tasted_at DESC
        "#,
    )
    .bind(wine_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(note_from_row).collect()
}

pub async fn delete_tasting_note(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM tasting_notes WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Tasting note {id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::create_schema;
    use crate::db::models::{Wine, WineType};

    async fn test_pool_with_wine() -> (SqlitePool, Uuid) {
        let pool = sqlx::sqlite::SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        let wine = Wine::new("Test".into(), "Producer".into(), WineType::Red, "Spain".into());
        crate::db::wines::insert_wine(&pool, &wine).await.unwrap();
        (pool, wine.id)
    }

    fn note(wine_id: Uuid, rating: i32, tasted_at: &str) -> TastingNote {
        TastingNote {
            id: Uuid::new_v4(),
            wine_id,
            rating,
            tasted_at: tasted_at.to_string(),
            appearance: Some("Deep ruby".into()),
            aroma: None,
            taste: None,
            finish: None,
            food_pairing: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn notes_list_most_recent_first() {
        let (pool, wine_id) = test_pool_with_wine().await;
        insert_tasting_note(&pool, &note(wine_id, 3, "2026-01-01T12:00:00Z")).await.unwrap();
        insert_tasting_note(&pool, &note(wine_id, 5, "2026-06-01T12:00:00Z")).await.unwrap();

        let notes = list_for_wine(&pool, wine_id).await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].rating, 5);
    }

    #[tokio::test]
    async fn rating_outside_range_is_rejected() {
        let (pool, wine_id) = test_pool_with_wine().await;
        let err = insert_tasting_note(&pool, &note(wine_id, 6, "2026-01-01T12:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn delete_removes_the_note() {
        let (pool, wine_id) = test_pool_with_wine().await;
        let n = note(wine_id, 4, "2026-01-01T12:00:00Z");
        insert_tasting_note(&pool, &n).await.unwrap();

        delete_tasting_note(&pool, n.id).await.unwrap();
        assert!(list_for_wine(&pool, wine_id).await.unwrap().is_empty());
        assert!(delete_tasting_note(&pool, n.id).await.is_err());
    }
}
