//! Wine image endpoints
//!
//! Uploads arrive base64-encoded, get downscaled and recompressed, and are
//! handed to whichever image store backend settings selected at startup.
//! The database keeps only the backend reference.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use vintry_common::db::{images, models::WineImage, wines};

use crate::images::compress_image;
use crate::{ApiError, ApiResult, AppState};

/// Upload payload for POST /api/wines/:id/images
#[derive(Debug, Deserialize)]
pub struct UploadImageRequest {
    /// Base64-encoded image bytes
    pub data: String,
}

/// GET /api/wines/:id/images
pub async fn list_images(
    State(state): State<AppState>,
    Path(wine_id): Path<Uuid>,
) -> ApiResult<Json<Vec<WineImage>>> {
    wines::load_wine(&state.db, wine_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Wine {wine_id}")))?;

    let list = images::list_for_wine(&state.db, wine_id).await?;
    Ok(Json(list))
}

/// POST /api/wines/:id/images
pub async fn upload_image(
    State(state): State<AppState>,
    Path(wine_id): Path<Uuid>,
    Json(payload): Json<UploadImageRequest>,
) -> ApiResult<(StatusCode, Json<WineImage>)> {
    wines::load_wine(&state.db, wine_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Wine {wine_id}")))?;

    let raw = BASE64
        .decode(payload.data.as_bytes())
        .map_err(|e| ApiError::BadRequest(format!("Invalid base64 image data: {e}")))?;
    if raw.is_empty() {
        return Err(ApiError::BadRequest("Image data is empty".to_string()));
    }

    let compressed = compress_image(&raw);
    let image_ref = state.image_store.put(wine_id, &compressed).await?;
    let image = images::insert_image(&state.db, wine_id, &image_ref).await?;

    info!(
        "Stored image {} for wine {wine_id} ({} bytes)",
        image.id,
        compressed.len()
    );
    Ok((StatusCode::CREATED, Json(image)))
}

/// DELETE /api/wines/:id/images
pub async fn delete_all_images(
    State(state): State<AppState>,
    Path(wine_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    wines::load_wine(&state.db, wine_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Wine {wine_id}")))?;

    let refs = images::delete_all_for_wine(&state.db, wine_id).await?;
    for image_ref in &refs {
        if let Err(e) = state.image_store.remove(image_ref).await {
            warn!("Failed to remove image {image_ref}: {e}");
        }
    }

    info!("Removed {} image(s) from wine {wine_id}", refs.len());
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/images/:id
///
/// Serves the stored payload. Everything is recompressed to JPEG on
/// upload, so the content type is fixed.
pub async fn get_image_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let image = images::load_image(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Wine image {id}")))?;

    let data = state.image_store.get(&image.image_ref).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], data))
}

/// DELETE /api/images/:id
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let image_ref = images::delete_image(&state.db, id).await?;
    // Row deletion is committed at this point; backend cleanup is best effort
    if let Err(e) = state.image_store.remove(&image_ref).await {
        warn!("Failed to remove image {image_ref}: {e}");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Build image routes
pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/wines/:id/images",
            get(list_images).post(upload_image).delete(delete_all_images),
        )
        .route(
            "/api/images/:id",
            get(get_image_data).delete(delete_image),
        )
}
