//! Image storage backends
//!
//! Label/bottle photos arrive as base64 payloads, get downscaled and
//! recompressed, and are persisted through a backend selected at startup:
//! filesystem files under the root folder, or blob rows in the database.
//! The `wine_images` table stores only the backend-specific reference.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;
use vintry_common::db::images as blobs;
use vintry_common::{Error, Result};

/// Longest edge kept when recompressing uploads
const MAX_IMAGE_WIDTH: u32 = 1200;
const JPEG_QUALITY: u8 = 70;

/// Storage backend for image payloads
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist a payload, returning the backend-specific reference
    async fn put(&self, wine_id: Uuid, data: &[u8]) -> Result<String>;
    async fn get(&self, image_ref: &str) -> Result<Vec<u8>>;
    /// Best-effort removal; a missing payload is not an error
    async fn remove(&self, image_ref: &str) -> Result<()>;
}

/// Build the backend named in settings ("filesystem" or "database")
pub fn create_image_store(
    backend: &str,
    pool: SqlitePool,
    images_dir: PathBuf,
) -> Result<Arc<dyn ImageStore>> {
    match backend {
        "filesystem" => Ok(Arc::new(FsImageStore::new(images_dir))),
        "database" => Ok(Arc::new(DbImageStore::new(pool))),
        other => Err(Error::Config(format!("Unknown image store backend: {other}"))),
    }
}

/// Downscale to at most [`MAX_IMAGE_WIDTH`] wide and recompress as JPEG.
///
/// Undecodable input passes through unchanged; the upload is stored as-is
/// rather than rejected.
pub fn compress_image(data: &[u8]) -> Vec<u8> {
    let img = match image::load_from_memory(data) {
        Ok(img) => img,
        Err(e) => {
            warn!("Image not decodable, storing original payload: {}", e);
            return data.to_vec();
        }
    };

    let img = if img.width() > MAX_IMAGE_WIDTH {
        let height = (img.height() as u64 * MAX_IMAGE_WIDTH as u64 / img.width() as u64) as u32;
        img.resize(MAX_IMAGE_WIDTH, height.max(1), FilterType::Triangle)
    } else {
        img
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    match img.write_with_encoder(encoder) {
        Ok(()) => out,
        Err(e) => {
            warn!("JPEG re-encode failed, storing original payload: {}", e);
            data.to_vec()
        }
    }
}

/// Filesystem-backed store: one file per image under the images directory
pub struct FsImageStore {
    dir: PathBuf,
}

impl FsImageStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, image_ref: &str) -> Result<PathBuf> {
        // Refs are generated filenames; reject anything path-like
        if image_ref.contains('/') || image_ref.contains('\\') || image_ref.contains("..") {
            return Err(Error::InvalidInput(format!("Bad image ref: {image_ref}")));
        }
        Ok(self.dir.join(image_ref))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn put(&self, wine_id: Uuid, data: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let image_ref = format!("{}-{}.jpg", wine_id, Uuid::new_v4());
        tokio::fs::write(self.dir.join(&image_ref), data).await?;
        Ok(image_ref)
    }

    async fn get(&self, image_ref: &str) -> Result<Vec<u8>> {
        let path = self.path_for(image_ref)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("Image {image_ref}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, image_ref: &str) -> Result<()> {
        let path = self.path_for(image_ref)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Database-blob-backed store for platforms without a usable filesystem
pub struct DbImageStore {
    pool: SqlitePool,
}

impl DbImageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageStore for DbImageStore {
    async fn put(&self, wine_id: Uuid, data: &[u8]) -> Result<String> {
        let blob_key = format!("{}-{}", wine_id, Uuid::new_v4());
        blobs::put_blob(&self.pool, &blob_key, data).await?;
        Ok(blob_key)
    }

    async fn get(&self, image_ref: &str) -> Result<Vec<u8>> {
        blobs::get_blob(&self.pool, image_ref).await
    }

    async fn remove(&self, image_ref: &str) -> Result<()> {
        blobs::delete_blob(&self.pool, image_ref).await
    }
}
