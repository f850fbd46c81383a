//! Settings endpoints
//!
//! API keys are stored as plain settings rows and returned as-is; this is
//! a single-user local service.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use vintry_common::db::settings;

use crate::{ApiError, ApiResult, AppState};

/// Full settings snapshot
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub ai_enabled: bool,
    pub openai_api_key: String,
    pub google_cloud_api_key: String,
    pub vivino_api_key: String,
    /// "filesystem" or "database"; applied on next startup
    pub image_store_backend: String,
}

/// Partial settings update; absent fields stay unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub ai_enabled: Option<bool>,
    pub openai_api_key: Option<String>,
    pub google_cloud_api_key: Option<String>,
    pub vivino_api_key: Option<String>,
    pub image_store_backend: Option<String>,
}

async fn snapshot(state: &AppState) -> ApiResult<SettingsResponse> {
    Ok(SettingsResponse {
        ai_enabled: settings::get_ai_enabled(&state.db).await?,
        openai_api_key: settings::get_openai_api_key(&state.db)
            .await?
            .unwrap_or_default(),
        google_cloud_api_key: settings::get_google_cloud_api_key(&state.db)
            .await?
            .unwrap_or_default(),
        vivino_api_key: settings::get_vivino_api_key(&state.db)
            .await?
            .unwrap_or_default(),
        image_store_backend: settings::get_image_store_backend(&state.db).await?,
    })
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<SettingsResponse>> {
    Ok(Json(snapshot(&state).await?))
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<SettingsResponse>> {
    if let Some(enabled) = payload.ai_enabled {
        settings::set_ai_enabled(&state.db, enabled).await?;
        info!("AI features {}", if enabled { "enabled" } else { "disabled" });
    }
    if let Some(key) = payload.openai_api_key {
        settings::set_openai_api_key(&state.db, key).await?;
        info!("OpenAI API key updated");
    }
    if let Some(key) = payload.google_cloud_api_key {
        settings::set_google_cloud_api_key(&state.db, key).await?;
        info!("Google Cloud API key updated");
    }
    if let Some(key) = payload.vivino_api_key {
        settings::set_vivino_api_key(&state.db, key).await?;
        info!("Vivino API key updated");
    }
    if let Some(backend) = payload.image_store_backend {
        if backend != "filesystem" && backend != "database" {
            return Err(ApiError::BadRequest(format!(
                "Unknown image store backend: {backend}"
            )));
        }
        settings::set_image_store_backend(&state.db, backend).await?;
        info!("Image store backend updated; takes effect on next startup");
    }

    Ok(Json(snapshot(&state).await?))
}

/// Build settings routes
pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/api/settings", get(get_settings).put(update_settings))
}
