//! Grid geometry and position display helpers
//!
//! Translates absolute page coordinates into discrete cell indices and
//! formats slots for display ("A-1" style: column letter, 1-based row).

use super::{Bounds, SlotKey};

/// Rendered cell edge length in layout units
pub const CELL_SIZE: f64 = 50.0;
/// Margin on each side of a cell
pub const CELL_MARGIN: f64 = 2.0;
/// Hold delay before a press becomes a drag, in milliseconds
pub const LONG_PRESS_MS: u64 = 300;

/// Measured layout of the rendered grid, in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Page x of the grid's top-left corner
    pub origin_x: f64,
    /// Page y of the grid's top-left corner
    pub origin_y: f64,
    pub cell_size: f64,
    pub cell_margin: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            cell_size: CELL_SIZE,
            cell_margin: CELL_MARGIN,
        }
    }
}

impl GridLayout {
    /// Distance from one cell's edge to the next (cell plus both margins)
    pub fn pitch(&self) -> f64 {
        self.cell_size + self.cell_margin * 2.0
    }

    /// Convert absolute page coordinates into a cell index.
    ///
    /// The first `cell_size` band on each axis holds the row/column labels,
    /// not cells. Scroll offsets shift the visible window over the grid.
    /// Points outside the label band and the cellar bounds map to None.
    pub fn cell_at(
        &self,
        bounds: Bounds,
        scroll_x: f64,
        scroll_y: f64,
        page_x: f64,
        page_y: f64,
    ) -> Option<SlotKey> {
        let relative_x = page_x - self.origin_x + scroll_x;
        let relative_y = page_y - self.origin_y + scroll_y;

        // Skip the label row/column
        let cell_area_x = relative_x - self.cell_size;
        let cell_area_y = relative_y - self.cell_size;

        if cell_area_x < 0.0 || cell_area_y < 0.0 {
            return None;
        }

        let column = (cell_area_x / self.pitch()).floor() as u32;
        let row = (cell_area_y / self.pitch()).floor() as u32;

        let slot = SlotKey::new(row, column);
        if bounds.contains(slot) {
            Some(slot)
        } else {
            None
        }
    }
}

/// Convert a zero-based column index to its letter label (A, B, .., Z, AA, ..)
pub fn column_to_letter(column: u32) -> String {
    let mut letter = String::new();
    let mut num = column as i64;

    while num >= 0 {
        letter.insert(0, (b'A' + (num % 26) as u8) as char);
        num = num / 26 - 1;
    }

    letter
}

/// Convert a letter label back to its zero-based column index
pub fn letter_to_column(letter: &str) -> Option<u32> {
    if letter.is_empty() {
        return None;
    }
    let mut column: u64 = 0;
    for ch in letter.chars() {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        column = column * 26 + (ch as u64 - 'A' as u64 + 1);
    }
    Some((column - 1) as u32)
}

/// One-based row number for display
pub fn row_to_display(row: u32) -> String {
    (row + 1).to_string()
}

/// Format a slot for display, e.g. "A-1", "B-3"
pub fn format_position(slot: SlotKey) -> String {
    format!("{}-{}", column_to_letter(slot.column), row_to_display(slot.row))
}
