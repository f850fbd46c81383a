//! Vintry - personal wine cellar service
//!
//! Single-user local HTTP service: a SQLite inventory of wines and
//! cellars, grid placement with collision checks, tasting and drinking
//! history, label photos, and optional AI collaborators.

pub mod api;
pub mod error;
pub mod images;
pub mod services;
pub mod state;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::images::ImageStore;
use crate::state::Library;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// In-memory inventory, re-derived from the database after writes
    pub library: Arc<Library>,
    /// Active image payload backend
    pub image_store: Arc<dyn ImageStore>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, image_store: Arc<dyn ImageStore>) -> Self {
        Self {
            db,
            library: Arc::new(Library::new()),
            image_store,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::wine_routes())
        .merge(api::cellar_routes())
        .merge(api::position_routes())
        .merge(api::tasting_note_routes())
        .merge(api::drinking_record_routes())
        .merge(api::image_routes())
        .merge(api::settings_routes())
        .merge(api::ai_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
