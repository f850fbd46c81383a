//! Cellar CRUD and resize endpoints
//!
//! Resizing is two-step: the first call reports which wines a shrink would
//! orphan, and only a call carrying `confirm_orphans` actually clears their
//! slots and applies the new bounds.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use vintry_common::db::{cellars, models::Cellar, wines};
use vintry_common::position::{shrink_impact, Bounds};

use crate::{ApiError, ApiResult, AppState};

/// Cellar create payload
#[derive(Debug, Deserialize)]
pub struct CreateCellarRequest {
    pub name: String,
    pub rows: u32,
    pub columns: u32,
    pub notes: Option<String>,
}

/// Cellar update payload (name and notes only; bounds go through resize)
#[derive(Debug, Deserialize)]
pub struct UpdateCellarRequest {
    pub name: String,
    pub notes: Option<String>,
}

/// Resize payload
#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    pub rows: u32,
    pub columns: u32,
    /// Confirms clearing the slots of wines the shrink would orphan
    #[serde(default)]
    pub confirm_orphans: bool,
}

/// Wine that would lose (or lost) its slot in a shrink
#[derive(Debug, Serialize)]
pub struct OrphanedWine {
    pub id: Uuid,
    pub name: String,
    pub row: u32,
    pub column: u32,
}

/// Resize response. `applied` is false when orphans were found but not
/// confirmed; the caller re-sends with `confirm_orphans` to proceed.
#[derive(Debug, Serialize)]
pub struct ResizeResponse {
    pub applied: bool,
    pub orphaned: Vec<OrphanedWine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cellar: Option<Cellar>,
}

/// GET /api/cellars
pub async fn list_cellars(State(state): State<AppState>) -> Json<Vec<Cellar>> {
    Json(state.library.cellars().await)
}

/// POST /api/cellars
pub async fn create_cellar(
    State(state): State<AppState>,
    Json(payload): Json<CreateCellarRequest>,
) -> ApiResult<(StatusCode, Json<Cellar>)> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Cellar name cannot be empty".to_string(),
        ));
    }

    let mut cellar = Cellar::new(payload.name, payload.rows, payload.columns);
    cellar.notes = payload.notes;
    cellars::insert_cellar(&state.db, &cellar).await?;
    state.library.add_cellar(cellar.clone()).await;

    info!(
        "Added cellar {} ({}x{})",
        cellar.name, cellar.rows, cellar.columns
    );
    Ok((StatusCode::CREATED, Json(cellar)))
}

/// GET /api/cellars/:id
pub async fn get_cellar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Cellar>> {
    let cellar = cellars::load_cellar(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cellar {id}")))?;
    Ok(Json(cellar))
}

/// PUT /api/cellars/:id
pub async fn update_cellar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCellarRequest>,
) -> ApiResult<Json<Cellar>> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Cellar name cannot be empty".to_string(),
        ));
    }

    cellars::update_cellar_details(&state.db, id, &payload.name, payload.notes.as_deref()).await?;
    let cellar = cellars::load_cellar(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cellar {id}")))?;
    state.library.update_cellar(id, cellar.clone()).await;

    Ok(Json(cellar))
}

/// GET /api/cellars/:id/wines
pub async fn list_cellar_wines(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<vintry_common::db::models::Wine>>> {
    cellars::load_cellar(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cellar {id}")))?;

    let list = wines::list_wines_in_cellar(&state.db, id).await?;
    Ok(Json(list))
}

/// POST /api/cellars/:id/resize
pub async fn resize_cellar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResizeRequest>,
) -> ApiResult<Json<ResizeResponse>> {
    Cellar::validate_bounds(payload.rows, payload.columns)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    cellars::load_cellar(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cellar {id}")))?;

    let occupants = wines::list_wines_in_cellar(&state.db, id).await?;
    let new_bounds = Bounds::new(payload.rows, payload.columns);
    let orphaned: Vec<OrphanedWine> = shrink_impact(&occupants, new_bounds)
        .into_iter()
        .filter_map(|wine| {
            wine.placement.slot().map(|slot| OrphanedWine {
                id: wine.id,
                name: wine.name.clone(),
                row: slot.row,
                column: slot.column,
            })
        })
        .collect();

    if !orphaned.is_empty() && !payload.confirm_orphans {
        return Ok(Json(ResizeResponse {
            applied: false,
            orphaned,
            cellar: None,
        }));
    }

    let orphan_ids: Vec<Uuid> = orphaned.iter().map(|o| o.id).collect();
    cellars::apply_resize(&state.db, id, new_bounds, &orphan_ids).await?;

    let cellar = cellars::load_cellar(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cellar {id}")))?;
    state.library.update_cellar(id, cellar.clone()).await;
    state.library.reload_wines(&state.db).await?;

    info!(
        "Resized cellar {} to {}x{}, {} wine(s) unplaced",
        cellar.name,
        cellar.rows,
        cellar.columns,
        orphan_ids.len()
    );
    Ok(Json(ResizeResponse {
        applied: true,
        orphaned,
        cellar: Some(cellar),
    }))
}

/// DELETE /api/cellars/:id
///
/// Wines stored in the cellar survive but lose their slots.
pub async fn delete_cellar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    cellars::delete_cellar(&state.db, id).await?;
    state.library.delete_cellar(id).await;
    state.library.reload_wines(&state.db).await?;

    info!("Deleted cellar {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// Build cellar routes
pub fn cellar_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cellars", get(list_cellars).post(create_cellar))
        .route(
            "/api/cellars/:id",
            get(get_cellar).put(update_cellar).delete(delete_cellar),
        )
        .route("/api/cellars/:id/wines", get(list_cellar_wines))
        .route("/api/cellars/:id/resize", post(resize_cellar))
}
