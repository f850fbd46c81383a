//! Shrink-impact calculation
//!
//! When a cellar's declared size is reduced, placed wines whose slot falls
//! outside the new bounds lose their position. This module only computes
//! the affected set; the caller decides whether to proceed and clears the
//! placements before applying the new bounds.

use super::Bounds;
use crate::db::models::Wine;

/// Wines whose current slot would fall outside `new_bounds`
pub fn shrink_impact<'a>(wines: &'a [Wine], new_bounds: Bounds) -> Vec<&'a Wine> {
    wines
        .iter()
        .filter(|w| match w.placement.slot() {
            Some(slot) => !new_bounds.contains(slot),
            None => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Wine, WineType};
    use crate::position::Placement;
    use uuid::Uuid;

    fn wine_at(cellar: Uuid, row: u32, column: u32) -> Wine {
        let mut wine = Wine::new("Test".into(), "Producer".into(), WineType::Red, "France".into());
        wine.placement = Placement::placed(cellar, row, column);
        wine
    }

    #[test]
    fn flags_wine_outside_reduced_rows() {
        let cellar = Uuid::new_v4();
        let wines = vec![wine_at(cellar, 4, 0), wine_at(cellar, 2, 0)];

        let affected = shrink_impact(&wines, Bounds::new(3, 10));
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].id, wines[0].id);
    }

    #[test]
    fn flags_wine_outside_reduced_columns() {
        let cellar = Uuid::new_v4();
        let wines = vec![wine_at(cellar, 0, 9)];

        let affected = shrink_impact(&wines, Bounds::new(5, 9));
        assert_eq!(affected.len(), 1);
    }

    #[test]
    fn unplaced_wines_are_never_affected() {
        let mut wine = wine_at(Uuid::new_v4(), 4, 4);
        wine.placement = Placement::Unplaced;
        let wines = [wine];

        let affected = shrink_impact(&wines, Bounds::new(1, 1));
        assert!(affected.is_empty());
    }

    #[test]
    fn growing_the_grid_affects_nobody() {
        let cellar = Uuid::new_v4();
        let wines = vec![wine_at(cellar, 4, 9)];
        assert!(shrink_impact(&wines, Bounds::new(10, 20)).is_empty());
    }
}
