//! Common error types for Vintry

use thiserror::Error;

/// Common result type for Vintry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Vintry crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Target slot lies outside the cellar grid
    #[error("Position ({row}, {column}) is outside the {rows}x{columns} grid")]
    OutOfBounds {
        row: u32,
        column: u32,
        rows: u32,
        columns: u32,
    },

    /// Target slot already holds a different wine
    #[error("Slot ({row}, {column}) is already occupied")]
    SlotOccupied { row: u32, column: u32 },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
