//! Wine CRUD and consumption endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use vintry_common::db::{models::Wine, wines};
use vintry_common::position::Placement;

use crate::api::positions::validate_placement;
use crate::{ApiError, ApiResult, AppState};

/// Wine create/update payload. The placement columns arrive flattened the
/// same way [`Wine`] serializes them.
#[derive(Debug, Deserialize)]
pub struct WineRequest {
    pub name: String,
    pub producer: String,
    pub vintage: Option<i32>,
    #[serde(rename = "type")]
    pub wine_type: vintry_common::db::models::WineType,
    pub country: String,
    pub region: Option<String>,
    #[serde(default)]
    pub grape_varieties: Vec<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<String>,
    pub purchase_location: Option<String>,
    pub bottle_size: Option<String>,
    pub alcohol_content: Option<f64>,
    pub drink_from: Option<i32>,
    pub drink_to: Option<i32>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub placement: Placement,
}

fn default_quantity() -> i64 {
    1
}

impl WineRequest {
    fn into_wine(self, id: Uuid) -> Wine {
        Wine {
            id,
            name: self.name,
            producer: self.producer,
            vintage: self.vintage,
            wine_type: self.wine_type,
            country: self.country,
            region: self.region,
            grape_varieties: self.grape_varieties,
            quantity: self.quantity,
            purchase_price: self.purchase_price,
            purchase_date: self.purchase_date,
            purchase_location: self.purchase_location,
            bottle_size: self.bottle_size,
            alcohol_content: self.alcohol_content,
            drink_from: self.drink_from,
            drink_to: self.drink_to,
            notes: self.notes,
            placement: self.placement,
        }
    }
}

/// Consumption payload for POST /api/wines/:id/drink
#[derive(Debug, Deserialize)]
pub struct DrinkRequest {
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    /// ISO-8601; defaults to now
    pub drunk_at: Option<String>,
    pub occasion: Option<String>,
    pub notes: Option<String>,
}

/// GET /api/wines
pub async fn list_wines(State(state): State<AppState>) -> Json<Vec<Wine>> {
    Json(state.library.wines().await)
}

/// POST /api/wines
pub async fn create_wine(
    State(state): State<AppState>,
    Json(payload): Json<WineRequest>,
) -> ApiResult<(StatusCode, Json<Wine>)> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Wine name cannot be empty".to_string()));
    }
    if payload.quantity < 0 {
        return Err(ApiError::BadRequest(
            "Quantity cannot be negative".to_string(),
        ));
    }

    let wine = payload.into_wine(Uuid::new_v4());
    validate_placement(&state.db, &wine.placement, wine.id).await?;
    wines::insert_wine(&state.db, &wine).await?;
    state.library.add_wine(wine.clone()).await;

    info!("Added wine {} ({})", wine.name, wine.id);
    Ok((StatusCode::CREATED, Json(wine)))
}

/// GET /api/wines/:id
pub async fn get_wine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Wine>> {
    let wine = wines::load_wine(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Wine {id}")))?;
    Ok(Json(wine))
}

/// PUT /api/wines/:id
pub async fn update_wine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WineRequest>,
) -> ApiResult<Json<Wine>> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Wine name cannot be empty".to_string()));
    }
    if payload.quantity < 0 {
        return Err(ApiError::BadRequest(
            "Quantity cannot be negative".to_string(),
        ));
    }

    let wine = payload.into_wine(id);
    validate_placement(&state.db, &wine.placement, id).await?;
    wines::update_wine(&state.db, &wine).await?;
    state.library.update_wine(id, wine.clone()).await;

    Ok(Json(wine))
}

/// DELETE /api/wines/:id
///
/// Cascades: tasting notes, drinking records and images go with the wine,
/// then the stored image payloads are removed from the backend.
pub async fn delete_wine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let image_refs = wines::delete_wine(&state.db, id).await?;
    state.library.delete_wine(id).await;

    for image_ref in &image_refs {
        if let Err(e) = state.image_store.remove(image_ref).await {
            warn!("Failed to remove image {image_ref}: {e}");
        }
    }

    info!("Deleted wine {id} and {} image(s)", image_refs.len());
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/wines/:id/drink
///
/// Records the consumption and decrements stock. Drinking the last bottle
/// clears the wine's slot.
pub async fn drink_wine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DrinkRequest>,
) -> ApiResult<Json<Wine>> {
    let drunk_at = payload
        .drunk_at
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    let wine = wines::record_drink(
        &state.db,
        id,
        payload.quantity,
        drunk_at,
        payload.occasion,
        payload.notes,
    )
    .await?;
    state.library.update_wine(id, wine.clone()).await;

    info!(
        "Recorded drink of {} bottle(s) of {}, {} left",
        payload.quantity, wine.name, wine.quantity
    );
    Ok(Json(wine))
}

/// Build wine routes
pub fn wine_routes() -> Router<AppState> {
    Router::new()
        .route("/api/wines", get(list_wines).post(create_wine))
        .route(
            "/api/wines/:id",
            get(get_wine).put(update_wine).delete(delete_wine),
        )
        .route("/api/wines/:id/drink", post(drink_wine))
}
