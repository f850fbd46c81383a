//! Drinking record endpoints
//!
//! Records are created through POST /api/wines/:id/drink, which is the only
//! path that also adjusts stock. These endpoints read and prune history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use uuid::Uuid;
use vintry_common::db::{drinking_records, models::DrinkingRecord, wines};

use crate::{ApiError, ApiResult, AppState};

/// GET /api/wines/:id/drinking-records
pub async fn list_drinking_records(
    State(state): State<AppState>,
    Path(wine_id): Path<Uuid>,
) -> ApiResult<Json<Vec<DrinkingRecord>>> {
    wines::load_wine(&state.db, wine_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Wine {wine_id}")))?;

    let records = drinking_records::list_for_wine(&state.db, wine_id).await?;
    Ok(Json(records))
}

/// DELETE /api/drinking-records/:id
///
/// Removes the history entry only; stock stays as it is.
pub async fn delete_drinking_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    drinking_records::delete_drinking_record(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build drinking record routes
pub fn drinking_record_routes() -> Router<AppState> {
    Router::new()
        .route("/api/wines/:id/drinking-records", get(list_drinking_records))
        .route("/api/drinking-records/:id", delete(delete_drinking_record))
}
