//! HTTP API handlers for the Vintry service

pub mod ai;
pub mod cellars;
pub mod drinking_records;
pub mod health;
pub mod images;
pub mod positions;
pub mod settings;
pub mod tasting_notes;
pub mod wines;

pub use ai::ai_routes;
pub use cellars::cellar_routes;
pub use drinking_records::drinking_record_routes;
pub use health::health_routes;
pub use images::image_routes;
pub use positions::position_routes;
pub use settings::settings_routes;
pub use tasting_notes::tasting_note_routes;
pub use wines::wine_routes;
