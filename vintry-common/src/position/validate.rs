//! Collision validation for slot placement

use super::{Bounds, PositionMap, SlotKey};
use crate::{Error, Result};
use uuid::Uuid;

/// Outcome of a successful placement check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementCheck {
    /// Target slot is free; the move is authorized
    Move,
    /// Target equals the wine's current slot; nothing to do
    NoOp,
}

/// Check whether `wine_id` may be placed at `target`.
///
/// Fails with `OutOfBounds` if the target lies outside the grid and with
/// `SlotOccupied` if a different wine already holds it. Placing a wine on
/// its own current slot is a no-op, not an error.
pub fn check_placement(
    map: &PositionMap,
    target: SlotKey,
    bounds: Bounds,
    wine_id: Uuid,
) -> Result<PlacementCheck> {
    if !bounds.contains(target) {
        return Err(Error::OutOfBounds {
            row: target.row,
            column: target.column,
            rows: bounds.rows,
            columns: bounds.columns,
        });
    }

    match map.occupant(target) {
        Some(occupant) if occupant == wine_id => Ok(PlacementCheck::NoOp),
        Some(_) => Err(Error::SlotOccupied {
            row: target.row,
            column: target.column,
        }),
        None => Ok(PlacementCheck::Move),
    }
}
