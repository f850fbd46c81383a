//! Tasting note endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use vintry_common::db::{models::TastingNote, tasting_notes, wines};

use crate::{ApiError, ApiResult, AppState};

/// Tasting note payload
#[derive(Debug, Deserialize)]
pub struct TastingNoteRequest {
    /// 1-5 stars
    pub rating: i32,
    /// ISO-8601; defaults to now
    pub tasted_at: Option<String>,
    pub appearance: Option<String>,
    pub aroma: Option<String>,
    pub taste: Option<String>,
    pub finish: Option<String>,
    pub food_pairing: Option<String>,
    pub notes: Option<String>,
}

/// GET /api/wines/:id/tasting-notes
pub async fn list_tasting_notes(
    State(state): State<AppState>,
    Path(wine_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TastingNote>>> {
    wines::load_wine(&state.db, wine_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Wine {wine_id}")))?;

    let notes = tasting_notes::list_for_wine(&state.db, wine_id).await?;
    Ok(Json(notes))
}

/// POST /api/wines/:id/tasting-notes
pub async fn create_tasting_note(
    State(state): State<AppState>,
    Path(wine_id): Path<Uuid>,
    Json(payload): Json<TastingNoteRequest>,
) -> ApiResult<(StatusCode, Json<TastingNote>)> {
    wines::load_wine(&state.db, wine_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Wine {wine_id}")))?;

    let note = TastingNote {
        id: Uuid::new_v4(),
        wine_id,
        rating: payload.rating,
        tasted_at: payload
            .tasted_at
            .unwrap_or_else(|| Utc::now().to_rfc3339()),
        appearance: payload.appearance,
        aroma: payload.aroma,
        taste: payload.taste,
        finish: payload.finish,
        food_pairing: payload.food_pairing,
        notes: payload.notes,
    };
    tasting_notes::insert_tasting_note(&state.db, &note).await?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// DELETE /api/tasting-notes/:id
pub async fn delete_tasting_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tasting_notes::delete_tasting_note(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build tasting note routes
pub fn tasting_note_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/wines/:id/tasting-notes",
            get(list_tasting_notes).post(create_tasting_note),
        )
        .route("/api/tasting-notes/:id", delete(delete_tasting_note))
}
