//! vintry - personal wine cellar service
//!
//! Serves the inventory API on localhost. The root folder (database and
//! stored images) resolves from the first CLI argument, then VINTRY_ROOT,
//! then the config file, then the OS data directory.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vintry_common::config;
use vintry_common::db::{init_database, settings};

use vintry_app::images::create_image_store;
use vintry_app::AppState;

const BIND_ADDR: &str = "127.0.0.1:5750";

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting vintry {}", env!("CARGO_PKG_VERSION"));

    let cli_root = std::env::args().nth(1);
    let root = config::resolve_root_folder(cli_root.as_deref(), "VINTRY_ROOT");
    let db_path = config::ensure_root_folder(&root)?;
    info!("Root folder: {}", root.display());
    info!("Database: {}", db_path.display());
    let db = init_database(&db_path).await?;

    let backend = settings::get_image_store_backend(&db).await?;
    let images_dir = root.join(config::IMAGES_DIR);
    let image_store = create_image_store(&backend, db.clone(), images_dir)?;
    info!("Image store backend: {backend}");

    let state = AppState::new(db, image_store);

    // Warm the in-memory inventory before accepting requests
    state.library.reload_wines(&state.db).await?;
    state.library.reload_cellars(&state.db).await?;
    info!(
        "Loaded {} wine(s) across {} cellar(s)",
        state.library.wines().await.len(),
        state.library.cellars().await.len()
    );

    let app = vintry_app::build_router(state);

    let listener = tokio::net::TcpListener::bind(BIND_ADDR).await?;
    info!("Listening on http://{BIND_ADDR}");
    axum::serve(listener, app).await?;

    Ok(())
}
