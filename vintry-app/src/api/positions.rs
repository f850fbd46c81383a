//! Position map and relocation endpoints
//!
//! The map is always re-derived from the wines table; relocation is a
//! check-then-write against that derived map.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;
use vintry_common::db::{cellars, models::Wine, wines};
use vintry_common::position::grid::format_position;
use vintry_common::position::{check_placement, Placement, PositionMap, SlotKey};

use crate::{ApiError, ApiResult, AppState};

/// One occupied slot in a cellar's grid
#[derive(Debug, Serialize)]
pub struct PositionEntry {
    pub row: u32,
    pub column: u32,
    pub wine_id: Uuid,
    /// Display form, e.g. "A-1"
    pub position: String,
}

/// Position map response for GET /api/cellars/:id/positions
#[derive(Debug, Serialize)]
pub struct PositionMapResponse {
    pub cellar_id: Uuid,
    pub rows: u32,
    pub columns: u32,
    pub slots: Vec<PositionEntry>,
}

/// Relocation payload. A null `cellar_id` removes the wine from its slot.
#[derive(Debug, Deserialize)]
pub struct RelocateRequest {
    pub cellar_id: Option<Uuid>,
    pub row: Option<u32>,
    pub column: Option<u32>,
}

/// Reject a placement whose cellar is missing, whose slot is outside the
/// grid, or whose slot another wine already holds. Unplaced always passes.
pub async fn validate_placement(
    pool: &SqlitePool,
    placement: &Placement,
    wine_id: Uuid,
) -> ApiResult<()> {
    let Placement::Placed { cellar_id, slot } = *placement else {
        return Ok(());
    };

    let cellar = cellars::load_cellar(pool, cellar_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cellar {cellar_id}")))?;

    let occupants = wines::list_wines_in_cellar(pool, cellar_id).await?;
    let map = PositionMap::from_wines(&occupants);
    check_placement(&map, slot, cellar.bounds(), wine_id)?;
    Ok(())
}

/// GET /api/cellars/:id/positions
pub async fn get_position_map(
    State(state): State<AppState>,
    Path(cellar_id): Path<Uuid>,
) -> ApiResult<Json<PositionMapResponse>> {
    let cellar = cellars::load_cellar(&state.db, cellar_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cellar {cellar_id}")))?;

    let occupants = wines::list_wines_in_cellar(&state.db, cellar_id).await?;
    let map = PositionMap::from_wines(&occupants);

    let mut slots: Vec<PositionEntry> = map
        .iter()
        .map(|(slot, wine_id)| PositionEntry {
            row: slot.row,
            column: slot.column,
            wine_id,
            position: format_position(slot),
        })
        .collect();
    slots.sort_by_key(|e| (e.row, e.column));

    Ok(Json(PositionMapResponse {
        cellar_id,
        rows: cellar.rows,
        columns: cellar.columns,
        slots,
    }))
}

/// GET /api/cellars/:id/positions/:row/:column
pub async fn get_slot_occupant(
    State(state): State<AppState>,
    Path((cellar_id, row, column)): Path<(Uuid, u32, u32)>,
) -> ApiResult<Json<Wine>> {
    cellars::load_cellar(&state.db, cellar_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Cellar {cellar_id}")))?;

    let wine = wines::wine_at_position(&state.db, cellar_id, row, column)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No wine at {}",
                format_position(SlotKey::new(row, column))
            ))
        })?;
    Ok(Json(wine))
}

/// PUT /api/wines/:id/position
pub async fn relocate_wine(
    State(state): State<AppState>,
    Path(wine_id): Path<Uuid>,
    Json(payload): Json<RelocateRequest>,
) -> ApiResult<Json<Wine>> {
    let placement = match payload.cellar_id {
        Some(cellar_id) => {
            let (Some(row), Some(column)) = (payload.row, payload.column) else {
                return Err(ApiError::BadRequest(
                    "row and column are required when cellar_id is set".to_string(),
                ));
            };
            Placement::Placed {
                cellar_id,
                slot: SlotKey::new(row, column),
            }
        }
        None => Placement::Unplaced,
    };

    // Existence check before the placement check so a bad wine id is a 404
    let wine = wines::load_wine(&state.db, wine_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Wine {wine_id}")))?;

    validate_placement(&state.db, &placement, wine_id).await?;
    wines::update_position(&state.db, wine_id, placement).await?;

    let updated = Wine { placement, ..wine };
    state.library.update_wine(wine_id, updated.clone()).await;

    match placement.slot() {
        Some(slot) => info!("Moved {} to {}", updated.name, format_position(slot)),
        None => info!("Removed {} from its slot", updated.name),
    }
    Ok(Json(updated))
}

/// Build position routes
pub fn position_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cellars/:id/positions", get(get_position_map))
        .route(
            "/api/cellars/:id/positions/:row/:column",
            get(get_slot_occupant),
        )
        .route("/api/wines/:id/position", put(relocate_wine))
}
