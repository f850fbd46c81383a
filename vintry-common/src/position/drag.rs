//! Drag session state machine
//!
//! Tracks the interval between a long-press on an occupied slot and the
//! release. The session is fed discrete events (press, hold timer, pointer
//! movement already translated to cells, release, cancel) and reports what
//! the caller should do on release. Timers and coordinate translation live
//! with the caller; see [`super::grid`].

use super::{check_placement, Bounds, PlacementCheck, PositionMap, SlotKey};
use crate::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    /// Contact on an occupied cell, hold delay not yet elapsed
    Pressed { wine: Uuid, origin: SlotKey },
    /// Hold delay elapsed; carries the wine and its source slot
    Dragging {
        wine: Uuid,
        origin: SlotKey,
        hover: Option<SlotKey>,
    },
}

/// What the caller should do after a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Release before the hold delay: treat as a plain tap on the cell
    Tap(SlotKey),
    /// No state change: released outside the grid, on the origin, or the
    /// session was not active
    Cancelled,
    /// Target slot holds another wine; the move is refused
    Rejected { slot: SlotKey },
    /// Free target: invoke the relocation executor, then reload the cellar
    Move {
        wine: Uuid,
        from: SlotKey,
        to: SlotKey,
    },
}

/// State machine over one pointer/touch session
#[derive(Debug, Clone, Copy)]
pub struct DragSession {
    state: State,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, State::Dragging { .. })
    }

    /// Slot currently hovered while dragging
    pub fn hover(&self) -> Option<SlotKey> {
        match self.state {
            State::Dragging { hover, .. } => hover,
            _ => None,
        }
    }

    pub fn dragged_wine(&self) -> Option<Uuid> {
        match self.state {
            State::Pressed { wine, .. } | State::Dragging { wine, .. } => Some(wine),
            State::Idle => None,
        }
    }

    /// Initial contact with a cell. Only an occupied cell can start a
    /// session; returns whether one started.
    pub fn press(&mut self, map: &PositionMap, slot: SlotKey) -> bool {
        if !matches!(self.state, State::Idle) {
            return false;
        }
        match map.occupant(slot) {
            Some(wine) => {
                self.state = State::Pressed { wine, origin: slot };
                true
            }
            None => false,
        }
    }

    /// The long-press timer fired while still pressed
    pub fn hold_elapsed(&mut self) {
        if let State::Pressed { wine, origin } = self.state {
            self.state = State::Dragging {
                wine,
                origin,
                hover: Some(origin),
            };
        }
    }

    /// Pointer moved to `cell` (None when outside the grid).
    ///
    /// Returns true when the hover slot changed, so the caller only
    /// re-renders on actual changes. Moving off the originating cell before
    /// the hold delay elapses abandons the press (it was a tap or scroll).
    pub fn pointer_moved(&mut self, cell: Option<SlotKey>) -> bool {
        match &mut self.state {
            State::Idle => false,
            State::Pressed { origin, .. } => {
                if cell != Some(*origin) {
                    self.state = State::Idle;
                }
                false
            }
            State::Dragging { hover, .. } => {
                if *hover == cell {
                    false
                } else {
                    *hover = cell;
                    true
                }
            }
        }
    }

    /// Pointer released; the session always returns to Idle.
    pub fn release(&mut self, map: &PositionMap, bounds: Bounds) -> DragOutcome {
        let state = std::mem::replace(&mut self.state, State::Idle);
        match state {
            State::Idle => DragOutcome::Cancelled,
            State::Pressed { origin, .. } => DragOutcome::Tap(origin),
            State::Dragging { wine, origin, hover } => {
                let Some(target) = hover else {
                    return DragOutcome::Cancelled;
                };
                if target == origin {
                    return DragOutcome::Cancelled;
                }
                match check_placement(map, target, bounds, wine) {
                    Ok(PlacementCheck::Move) => DragOutcome::Move {
                        wine,
                        from: origin,
                        to: target,
                    },
                    Ok(PlacementCheck::NoOp) => DragOutcome::Cancelled,
                    Err(Error::SlotOccupied { row, column }) => DragOutcome::Rejected {
                        slot: SlotKey::new(row, column),
                    },
                    Err(_) => DragOutcome::Cancelled,
                }
            }
        }
    }

    /// Explicit cancel signal (escape key); no relocation happens
    pub fn cancel(&mut self) {
        self.state = State::Idle;
    }
}
