//! Cellar position management
//!
//! The occupancy map is always re-derived from the wine list after a write;
//! it is never patched incrementally. Collision checks happen at write time
//! against the derived map, not via a database constraint.

pub mod drag;
pub mod grid;
pub mod map;
pub mod shrink;
pub mod validate;

pub use drag::{DragOutcome, DragSession};
pub use map::PositionMap;
pub use shrink::shrink_impact;
pub use validate::{check_placement, PlacementCheck};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grid dimensions of a cellar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub rows: u32,
    pub columns: u32,
}

impl Bounds {
    pub fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Whether a slot lies inside this grid
    pub fn contains(&self, slot: SlotKey) -> bool {
        slot.row < self.rows && slot.column < self.columns
    }
}

/// A (row, column) slot in a cellar grid, zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub row: u32,
    pub column: u32,
}

impl SlotKey {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Where a wine sits, if anywhere
///
/// Stored as three nullable columns (cellar_id, position_row,
/// position_column); in memory the placed/unplaced distinction is explicit
/// so callers must handle both states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PlacementColumns", into = "PlacementColumns")]
pub enum Placement {
    Placed { cellar_id: Uuid, slot: SlotKey },
    Unplaced,
}

impl Placement {
    pub fn placed(cellar_id: Uuid, row: u32, column: u32) -> Self {
        Placement::Placed {
            cellar_id,
            slot: SlotKey::new(row, column),
        }
    }

    pub fn slot(&self) -> Option<SlotKey> {
        match self {
            Placement::Placed { slot, .. } => Some(*slot),
            Placement::Unplaced => None,
        }
    }

    pub fn cellar_id(&self) -> Option<Uuid> {
        match self {
            Placement::Placed { cellar_id, .. } => Some(*cellar_id),
            Placement::Unplaced => None,
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed { .. })
    }

    /// Reassemble from the storage encoding. Partial placements (any of the
    /// three columns NULL) collapse to Unplaced.
    pub fn from_columns(
        cellar_id: Option<Uuid>,
        row: Option<u32>,
        column: Option<u32>,
    ) -> Self {
        match (cellar_id, row, column) {
            (Some(cellar_id), Some(row), Some(column)) => Placement::placed(cellar_id, row, column),
            _ => Placement::Unplaced,
        }
    }
}

/// Wire/storage encoding of a placement: three optional columns
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlacementColumns {
    pub cellar_id: Option<Uuid>,
    pub position_row: Option<u32>,
    pub position_column: Option<u32>,
}

impl From<PlacementColumns> for Placement {
    fn from(c: PlacementColumns) -> Self {
        Placement::from_columns(c.cellar_id, c.position_row, c.position_column)
    }
}

impl From<Placement> for PlacementColumns {
    fn from(p: Placement) -> Self {
        match p {
            Placement::Placed { cellar_id, slot } => PlacementColumns {
                cellar_id: Some(cellar_id),
                position_row: Some(slot.row),
                position_column: Some(slot.column),
            },
            Placement::Unplaced => PlacementColumns {
                cellar_id: None,
                position_row: None,
                position_column: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_placement_collapses_to_unplaced() {
        let id = Uuid::new_v4();
        assert_eq!(
            Placement::from_columns(Some(id), Some(1), None),
            Placement::Unplaced
        );
        assert_eq!(
            Placement::from_columns(None, Some(1), Some(2)),
            Placement::Unplaced
        );
        assert_eq!(
            Placement::from_columns(Some(id), Some(1), Some(2)),
            Placement::placed(id, 1, 2)
        );
    }

    #[test]
    fn placement_serde_uses_column_names() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(Placement::placed(id, 3, 4)).unwrap();
        assert_eq!(json["position_row"], 3);
        assert_eq!(json["position_column"], 4);

        let back: Placement = serde_json::from_value(json).unwrap();
        assert_eq!(back, Placement::placed(id, 3, 4));
    }
}
