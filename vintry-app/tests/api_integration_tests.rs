//! Integration tests for the inventory HTTP API
//!
//! Each test builds the full router against an in-memory database and
//! drives it with tower's oneshot.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;
use vintry_app::images::{create_image_store, ImageStore};
use vintry_app::{build_router, AppState};

async fn test_app() -> (Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    vintry_common::db::init::create_schema(&pool).await.unwrap();
    vintry_common::db::init::init_default_settings(&pool)
        .await
        .unwrap();

    // Blob-backed image store keeps the whole test in memory
    let store = create_image_store("database", pool.clone(), std::env::temp_dir()).unwrap();
    let state = AppState::new(pool.clone(), store);
    (build_router(state), pool)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn wine_payload(name: &str) -> Value {
    json!({
        "name": name,
        "producer": "Test Estate",
        "type": "red",
        "country": "France",
        "quantity": 2
    })
}

async fn create_cellar(app: &Router, rows: u32, columns: u32) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/cellars",
        Some(json!({ "name": "Basement", "rows": rows, "columns": columns })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_wine(app: &Router, name: &str) -> String {
    let (status, body) = send(app, "POST", "/api/wines", Some(wine_payload(name))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn place_wine(app: &Router, wine_id: &str, cellar_id: &str, row: u32, column: u32) {
    let (status, _) = send(
        app,
        "PUT",
        &format!("/api/wines/{wine_id}/position"),
        Some(json!({ "cellar_id": cellar_id, "row": row, "column": column })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _pool) = test_app().await;

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn wine_crud_round_trip() {
    let (app, _pool) = test_app().await;

    let id = create_wine(&app, "Chateau Test").await;

    let (status, body) = send(&app, "GET", &format!("/api/wines/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Chateau Test");
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["cellar_id"], Value::Null);

    let mut updated = wine_payload("Chateau Test");
    updated["vintage"] = json!(2018);
    updated["region"] = json!("Bordeaux");
    let (status, body) = send(&app, "PUT", &format!("/api/wines/{id}"), Some(updated)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vintage"], 2018);
    assert_eq!(body["region"], "Bordeaux");

    let (status, body) = send(&app, "GET", "/api/wines", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/wines/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/wines/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_wine_rejects_blank_name() {
    let (app, _pool) = test_app().await;

    let (status, body) = send(&app, "POST", "/api/wines", Some(wine_payload("  "))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn relocation_updates_the_position_map() {
    let (app, _pool) = test_app().await;

    let cellar_id = create_cellar(&app, 5, 10).await;
    let wine_id = create_wine(&app, "Moveable Wine").await;
    place_wine(&app, &wine_id, &cellar_id, 2, 3).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/cellars/{cellar_id}/positions"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 5);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["row"], 2);
    assert_eq!(slots[0]["column"], 3);
    assert_eq!(slots[0]["wine_id"].as_str().unwrap(), wine_id);
    assert_eq!(slots[0]["position"], "D-3");

    // Move to a free slot, then unplace
    place_wine(&app, &wine_id, &cellar_id, 4, 1).await;
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/wines/{wine_id}/position"),
        Some(json!({ "cellar_id": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cellar_id"], Value::Null);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/cellars/{cellar_id}/positions"),
        None,
    )
    .await;
    assert!(body["slots"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn relocation_to_an_occupied_slot_is_a_conflict() {
    let (app, _pool) = test_app().await;

    let cellar_id = create_cellar(&app, 5, 10).await;
    let first = create_wine(&app, "Sitting Wine").await;
    let second = create_wine(&app, "Pushy Wine").await;
    place_wine(&app, &first, &cellar_id, 1, 1).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/wines/{second}/position"),
        Some(json!({ "cellar_id": cellar_id, "row": 1, "column": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "SLOT_OCCUPIED");

    // Re-placing a wine on its own slot is fine
    place_wine(&app, &first, &cellar_id, 1, 1).await;
}

#[tokio::test]
async fn relocation_outside_the_grid_is_rejected() {
    let (app, _pool) = test_app().await;

    let cellar_id = create_cellar(&app, 5, 10).await;
    let wine_id = create_wine(&app, "Lost Wine").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/wines/{wine_id}/position"),
        Some(json!({ "cellar_id": cellar_id, "row": 9, "column": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "OUT_OF_BOUNDS");
}

#[tokio::test]
async fn drinking_all_bottles_frees_the_slot() {
    let (app, _pool) = test_app().await;

    let cellar_id = create_cellar(&app, 5, 10).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/wines",
        Some(json!({
            "name": "Last Bottles",
            "producer": "Test Estate",
            "type": "red",
            "country": "France",
            "quantity": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let wine_id = body["id"].as_str().unwrap().to_string();
    place_wine(&app, &wine_id, &cellar_id, 2, 2).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/wines/{wine_id}/drink"),
        Some(json!({ "quantity": 3, "occasion": "Birthday" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 0);
    assert_eq!(body["cellar_id"], Value::Null);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/cellars/{cellar_id}/positions"),
        None,
    )
    .await;
    assert!(body["slots"].as_array().unwrap().is_empty());

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/wines/{wine_id}/drinking-records"),
        None,
    )
    .await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["occasion"], "Birthday");
    assert_eq!(records[0]["quantity"], 3);
}

#[tokio::test]
async fn shrink_requires_confirmation_when_wines_would_be_orphaned() {
    let (app, _pool) = test_app().await;

    let cellar_id = create_cellar(&app, 5, 10).await;
    let safe = create_wine(&app, "Safe Wine").await;
    let doomed = create_wine(&app, "Doomed Wine").await;
    place_wine(&app, &safe, &cellar_id, 1, 1).await;
    place_wine(&app, &doomed, &cellar_id, 4, 9).await;

    // Preview: nothing applied, the affected wine reported
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/cellars/{cellar_id}/resize"),
        Some(json!({ "rows": 3, "columns": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);
    let orphaned = body["orphaned"].as_array().unwrap();
    assert_eq!(orphaned.len(), 1);
    assert_eq!(orphaned[0]["id"].as_str().unwrap(), doomed);

    let (_, body) = send(&app, "GET", &format!("/api/cellars/{cellar_id}"), None).await;
    assert_eq!(body["rows"], 5);

    // Confirmed: bounds change and the orphan loses its slot
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/cellars/{cellar_id}/resize"),
        Some(json!({ "rows": 3, "columns": 10, "confirm_orphans": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);
    assert_eq!(body["cellar"]["rows"], 3);

    let (_, body) = send(&app, "GET", &format!("/api/wines/{doomed}"), None).await;
    assert_eq!(body["cellar_id"], Value::Null);
    let (_, body) = send(&app, "GET", &format!("/api/wines/{safe}"), None).await;
    assert_eq!(body["position_row"], 1);
}

#[tokio::test]
async fn growing_a_cellar_applies_immediately() {
    let (app, _pool) = test_app().await;

    let cellar_id = create_cellar(&app, 5, 10).await;
    let wine_id = create_wine(&app, "Settled Wine").await;
    place_wine(&app, &wine_id, &cellar_id, 4, 9).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/cellars/{cellar_id}/resize"),
        Some(json!({ "rows": 8, "columns": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);
    assert!(body["orphaned"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cellar_bounds_are_capped() {
    let (app, _pool) = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/cellars",
        Some(json!({ "name": "Too Big", "rows": 21, "columns": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let cellar_id = create_cellar(&app, 5, 10).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/cellars/{cellar_id}/resize"),
        Some(json!({ "rows": 5, "columns": 31 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_cellar_unplaces_its_wines() {
    let (app, _pool) = test_app().await;

    let cellar_id = create_cellar(&app, 5, 10).await;
    let wine_id = create_wine(&app, "Homeless Soon").await;
    place_wine(&app, &wine_id, &cellar_id, 3, 3).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/cellars/{cellar_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/wines/{wine_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cellar_id"], Value::Null);
}

#[tokio::test]
async fn tasting_note_flow() {
    let (app, _pool) = test_app().await;

    let wine_id = create_wine(&app, "Noted Wine").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/wines/{wine_id}/tasting-notes"),
        Some(json!({ "rating": 4, "aroma": "Cherries", "taste": "Dry, firm tannins" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let note_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/wines/{wine_id}/tasting-notes"),
        Some(json!({ "rating": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/wines/{wine_id}/tasting-notes"),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/tasting-notes/{note_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn image_upload_fetch_and_delete() {
    let (app, _pool) = test_app().await;

    let wine_id = create_wine(&app, "Photographed Wine").await;
    let payload = BASE64.encode(b"not really a jpeg");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/wines/{wine_id}/images"),
        Some(json!({ "data": payload })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let image_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["display_order"], 0);

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/images/{image_id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Undecodable uploads are stored verbatim
    assert_eq!(&bytes[..], b"not really a jpeg");

    let (status, _) = send(&app, "DELETE", &format!("/api/images/{image_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/images/{image_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Store whose removals always fail; writes and reads pass through
struct StuckStore {
    inner: std::sync::Arc<dyn ImageStore>,
}

#[async_trait::async_trait]
impl ImageStore for StuckStore {
    async fn put(&self, wine_id: uuid::Uuid, data: &[u8]) -> vintry_common::Result<String> {
        self.inner.put(wine_id, data).await
    }

    async fn get(&self, image_ref: &str) -> vintry_common::Result<Vec<u8>> {
        self.inner.get(image_ref).await
    }

    async fn remove(&self, _image_ref: &str) -> vintry_common::Result<()> {
        Err(vintry_common::Error::Internal("backend unavailable".into()))
    }
}

#[tokio::test]
async fn image_delete_succeeds_when_backend_removal_fails() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    vintry_common::db::init::create_schema(&pool).await.unwrap();
    vintry_common::db::init::init_default_settings(&pool)
        .await
        .unwrap();

    let inner = create_image_store("database", pool.clone(), std::env::temp_dir()).unwrap();
    let state = AppState::new(pool.clone(), std::sync::Arc::new(StuckStore { inner }));
    let app = build_router(state);

    let wine_id = create_wine(&app, "Stuck Backend").await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/wines/{wine_id}/images"),
        Some(json!({ "data": BASE64.encode(b"payload") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let image_id = body["id"].as_str().unwrap().to_string();

    // Once the row is gone the response is 204 regardless of the backend
    let (status, _) = send(&app, "DELETE", &format!("/api/images/{image_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/images/{image_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_base64_upload_is_rejected() {
    let (app, _pool) = test_app().await;

    let wine_id = create_wine(&app, "No Photo").await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/wines/{wine_id}/images"),
        Some(json!({ "data": "!!! not base64 !!!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settings_round_trip() {
    let (app, _pool) = test_app().await;

    let (status, body) = send(&app, "GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ai_enabled"], false);
    assert_eq!(body["image_store_backend"], "filesystem");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(json!({ "ai_enabled": true, "openai_api_key": "sk-test" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ai_enabled"], true);
    assert_eq!(body["openai_api_key"], "sk-test");
    // Untouched keys keep their values
    assert_eq!(body["google_cloud_api_key"], "");
}

#[tokio::test]
async fn image_store_backend_is_switchable_through_settings() {
    let (app, pool) = test_app().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(json!({ "image_store_backend": "database" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image_store_backend"], "database");
    assert_eq!(
        vintry_common::db::settings::get_image_store_backend(&pool)
            .await
            .unwrap(),
        "database"
    );

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(json!({ "image_store_backend": "s3" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn ai_endpoints_refuse_when_disabled() {
    let (app, _pool) = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/ai/sommelier",
        Some(json!({ "question": "What pairs with duck?" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("disabled"));
}

#[tokio::test]
async fn ai_endpoints_require_a_key_once_enabled() {
    let (app, _pool) = test_app().await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(json!({ "ai_enabled": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/ai/recognize-label",
        Some(json!({ "image": BASE64.encode(b"fake image") })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("key"));
}
