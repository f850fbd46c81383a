//! AI collaborator endpoints
//!
//! Every handler re-reads the toggle and keys from settings so changes
//! take effect without a restart. Label recognition prefers the OpenAI
//! path and falls back to Google Vision when only that key is set.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;
use vintry_common::db::settings;

use crate::services::openai::OpenAiClient;
use crate::services::vision::VisionClient;
use crate::services::LabelRecognition;
use crate::{ApiError, ApiResult, AppState};

/// Label photo payload
#[derive(Debug, Deserialize)]
pub struct RecognizeLabelRequest {
    /// Base64-encoded image bytes
    pub image: String,
}

/// Sommelier question payload
#[derive(Debug, Deserialize)]
pub struct SommelierRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct SommelierResponse {
    pub answer: String,
}

/// Tasting note generation payload
#[derive(Debug, Deserialize)]
pub struct GenerateNoteRequest {
    /// The drinker's rough impression
    pub impression: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateNoteResponse {
    pub note: String,
}

async fn require_ai_enabled(state: &AppState) -> ApiResult<()> {
    if !settings::get_ai_enabled(&state.db).await? {
        return Err(ApiError::BadRequest(
            "AI features are disabled in settings".to_string(),
        ));
    }
    Ok(())
}

async fn openai_client(state: &AppState) -> ApiResult<OpenAiClient> {
    let key = settings::get_openai_api_key(&state.db)
        .await?
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("OpenAI API key is not configured".to_string()))?;
    OpenAiClient::new(key).map_err(|e| ApiError::Internal(e.to_string()))
}

/// POST /api/ai/recognize-label
pub async fn recognize_label(
    State(state): State<AppState>,
    Json(payload): Json<RecognizeLabelRequest>,
) -> ApiResult<Json<LabelRecognition>> {
    require_ai_enabled(&state).await?;
    if payload.image.is_empty() {
        return Err(ApiError::BadRequest("Image data is empty".to_string()));
    }

    let openai_key = settings::get_openai_api_key(&state.db)
        .await?
        .filter(|k| !k.trim().is_empty());
    let vision_key = settings::get_google_cloud_api_key(&state.db)
        .await?
        .filter(|k| !k.trim().is_empty());

    let result = match (openai_key, vision_key) {
        (Some(key), _) => {
            let client = OpenAiClient::new(key).map_err(|e| ApiError::Internal(e.to_string()))?;
            client.recognize_label(&payload.image).await.map_err(|e| {
                warn!("OpenAI label recognition failed: {e}");
                ApiError::Upstream(e.to_string())
            })?
        }
        (None, Some(key)) => {
            let client = VisionClient::new(key).map_err(|e| ApiError::Internal(e.to_string()))?;
            client.recognize_label(&payload.image).await.map_err(|e| {
                warn!("Vision label recognition failed: {e}");
                ApiError::Upstream(e.to_string())
            })?
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "No label recognition API key is configured".to_string(),
            ))
        }
    };

    Ok(Json(result))
}

/// POST /api/ai/sommelier
pub async fn ask_sommelier(
    State(state): State<AppState>,
    Json(payload): Json<SommelierRequest>,
) -> ApiResult<Json<SommelierResponse>> {
    require_ai_enabled(&state).await?;
    if payload.question.trim().is_empty() {
        return Err(ApiError::BadRequest("Question cannot be empty".to_string()));
    }

    let client = openai_client(&state).await?;
    let summary = state.library.inventory_summary().await;
    let answer = client
        .ask_sommelier(&payload.question, &summary)
        .await
        .map_err(|e| {
            warn!("Sommelier chat failed: {e}");
            ApiError::Upstream(e.to_string())
        })?;

    Ok(Json(SommelierResponse { answer }))
}

/// POST /api/ai/tasting-note
pub async fn generate_tasting_note(
    State(state): State<AppState>,
    Json(payload): Json<GenerateNoteRequest>,
) -> ApiResult<Json<GenerateNoteResponse>> {
    require_ai_enabled(&state).await?;
    if payload.impression.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Impression cannot be empty".to_string(),
        ));
    }

    let client = openai_client(&state).await?;
    let note = client
        .generate_tasting_note(&payload.impression)
        .await
        .map_err(|e| {
            warn!("Tasting note generation failed: {e}");
            ApiError::Upstream(e.to_string())
        })?;

    Ok(Json(GenerateNoteResponse { note }))
}

/// Build AI routes
pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ai/recognize-label", post(recognize_label))
        .route("/api/ai/sommelier", post(ask_sommelier))
        .route("/api/ai/tasting-note", post(generate_tasting_note))
}
