//! Clear matched jewels and let the rest fall.

use crate::field::{Cell, Field};
use tracing::debug;

impl Field {
    /// Remove every matched jewel, then compact each column. Returns the number removed.
    pub fn clear(&mut self) -> usize {
        let mut removed = 0;
        for cell in self.columns_mut().iter_mut().flatten() {
            if matches!(cell, Cell::Matched(_)) {
                *cell = Cell::Empty;
                removed += 1;
            }
        }
        self.compact();
        if removed > 0 {
            debug!(removed, "cleared matched jewels");
        }
        removed
    }

    /// Gravity: empties to the top, everything else to the bottom in the same order.
    pub(crate) fn compact(&mut self) {
        for col in self.columns_mut() {
            let height = col.len();
            let mut stacked: Vec<Cell> = col.iter().copied().filter(|c| !c.is_empty()).collect();
            let mut compacted = vec![Cell::Empty; height - stacked.len()];
            compacted.append(&mut stacked);
            *col = compacted;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::field::{Cell, Field, Jewel};

    fn column_of(field: &Field, x: usize) -> Vec<Cell> {
        field.column(x).unwrap().to_vec()
    }

    #[test]
    fn test_clear_bottom_match_drops_stack() {
        let mut field = Field::new(4, 1).unwrap();
        let bottom = field.height() - 1;
        field.set(0, bottom, Cell::Matched(Jewel::S));
        field.set(0, bottom - 1, Cell::Frozen(Jewel::T));
        field.set(0, bottom - 2, Cell::Frozen(Jewel::V));

        assert_eq!(field.clear(), 1);
        assert_eq!(field.get(0, bottom), Some(Cell::Frozen(Jewel::T)));
        assert_eq!(field.get(0, bottom - 1), Some(Cell::Frozen(Jewel::V)));
        assert_eq!(field.get(0, bottom - 2), Some(Cell::Empty));
        assert_eq!(field.settled_height(0), 2);
    }

    #[test]
    fn test_clear_keeps_order_across_gaps() {
        let mut field = Field::new(4, 1).unwrap();
        let bottom = field.height() - 1;
        field.set(0, bottom - 5, Cell::Frozen(Jewel::W));
        field.set(0, bottom - 4, Cell::Matched(Jewel::S));
        field.set(0, bottom - 3, Cell::Frozen(Jewel::X));
        field.set(0, bottom - 1, Cell::Matched(Jewel::S));
        field.set(0, bottom, Cell::Frozen(Jewel::Y));

        assert_eq!(field.clear(), 2);
        let col = column_of(&field, 0);
        assert_eq!(
            col[bottom - 2..],
            [
                Cell::Frozen(Jewel::W),
                Cell::Frozen(Jewel::X),
                Cell::Frozen(Jewel::Y)
            ]
        );
        assert!(col[..bottom - 2].iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_clear_without_matches_is_noop() {
        let mut field = Field::new(3, 2).unwrap();
        let bottom = field.height() - 1;
        field.set(1, bottom, Cell::Frozen(Jewel::Z));
        let before = field.clone();
        assert_eq!(field.clear(), 0);
        assert_eq!(field, before);
    }
}
