//! Database models and queries

pub mod cellars;
pub mod drinking_records;
pub mod images;
pub mod init;
pub mod models;
pub mod settings;
pub mod tasting_notes;
pub mod wines;

pub use init::*;
pub use models::*;
