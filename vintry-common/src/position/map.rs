//! Position map builder
//!
//! Derives the sparse occupied-slot lookup for one cellar from the flat
//! wine list. The map is a pure re-derivation: after any relocation the
//! caller re-fetches the cellar's wines and rebuilds.

use super::{Placement, SlotKey};
use crate::db::models::Wine;
use std::collections::HashMap;
use uuid::Uuid;

/// Sparse lookup from occupied slot to the wine occupying it
#[derive(Debug, Clone, Default)]
pub struct PositionMap {
    slots: HashMap<SlotKey, Uuid>,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from wines believed to belong to one cellar.
    ///
    /// Unplaced wines are excluded. If the input already violates the
    /// one-wine-per-slot invariant, the last wine wins.
    pub fn from_wines<'a>(wines: impl IntoIterator<Item = &'a Wine>) -> Self {
        Self::from_placements(wines.into_iter().map(|w| (w.id, w.placement)))
    }

    pub fn from_placements(placements: impl IntoIterator<Item = (Uuid, Placement)>) -> Self {
        let mut slots = HashMap::new();
        for (id, placement) in placements {
            if let Some(slot) = placement.slot() {
                slots.insert(slot, id);
            }
        }
        Self { slots }
    }

    /// Wine occupying the slot, if any
    pub fn occupant(&self, slot: SlotKey) -> Option<Uuid> {
        self.slots.get(&slot).copied()
    }

    pub fn is_occupied(&self, slot: SlotKey) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate occupied slots in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, Uuid)> + '_ {
        self.slots.iter().map(|(k, v)| (*k, *v))
    }
}
