//! # Vintry Common Library
//!
//! Shared code for the Vintry wine-cellar service including:
//! - Database models and queries
//! - Position-management core (occupancy map, collision checks, drag sessions)
//! - Configuration loading
//! - Error types

pub mod config;
pub mod db;
pub mod error;
pub mod position;

pub use error::{Error, Result};
pub use position::{Bounds, Placement, SlotKey};
