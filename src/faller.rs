//! Faller: spawning, left/right movement, rotation, and the faller generator.

use crate::error::EngineError;
use crate::field::{Cell, Field, Jewel, SPAWN_ROWS};
use tracing::{debug, trace};

/// A new faller: target column and its three jewels, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Faller {
    pub column: usize,
    pub jewels: [Jewel; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Field {
    /// Place a faller at the top of `column`.
    ///
    /// The lowest jewel goes into the first visible row, or one row higher when that
    /// row is already occupied. Occupied cells are never overwritten. A faller that
    /// has nothing empty beneath it lands immediately.
    pub fn drop_faller(&mut self, faller: Faller) -> Result<(), EngineError> {
        let Faller { column, jewels } = faller;
        let columns = self.width();
        let col = self
            .columns_mut()
            .get_mut(column)
            .ok_or(EngineError::ColumnOutOfRange { column, columns })?;

        let first = if col[SPAWN_ROWS].is_empty() { 1 } else { 0 };
        for (slot, jewel) in col[first..first + jewels.len()].iter_mut().zip(jewels) {
            if slot.is_empty() {
                *slot = Cell::Falling(jewel);
            }
        }
        debug!(column, ?jewels, "dropped faller");

        if self.is_grounded(column) {
            self.land(column);
        }
        Ok(())
    }

    /// Cycle the faller's jewels down one place; the bottom jewel wraps to the top.
    pub fn rotate(&mut self) -> bool {
        let Some(x) = self.active_column() else {
            return false;
        };
        let col = &mut self.columns_mut()[x];
        let rows: Vec<usize> = (0..col.len()).filter(|&y| col[y].is_active()).collect();
        let mut jewels: Vec<Jewel> = rows.iter().filter_map(|&y| col[y].jewel()).collect();
        jewels.rotate_right(1);

        for (&y, jewel) in rows.iter().zip(jewels) {
            col[y] = match col[y] {
                Cell::Falling(_) => Cell::Falling(jewel),
                Cell::Landed(_) => Cell::Landed(jewel),
                other => other,
            };
        }
        trace!(column = x, "rotated faller");
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(Side::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(Side::Right)
    }

    /// Move the faller one column if the destination is free at its lowest row.
    /// The faller falls again or stays landed depending on what is under it there.
    pub fn shift(&mut self, side: Side) -> bool {
        let Some(from) = self.active_column() else {
            return false;
        };
        let to = match side {
            Side::Left => from.checked_sub(1),
            Side::Right => Some(from + 1).filter(|&x| x < self.width()),
        };
        let (Some(to), Some(lowest)) = (to, self.lowest_active_row(from)) else {
            return false;
        };
        let cols = self.columns_mut();
        if !cols[to][lowest].is_empty() {
            return false;
        }

        let tag: fn(Jewel) -> Cell = match cols[to].get(lowest + 1) {
            Some(Cell::Empty) => Cell::Falling,
            _ => Cell::Landed,
        };
        for y in 0..=lowest {
            let cell = cols[from][y];
            if cell.is_active() {
                cols[to][y] = cell.retag(tag);
                cols[from][y] = Cell::Empty;
            }
        }
        trace!(from, to, "shifted faller");
        true
    }
}

/// Endless source of fallers: random column and jewels from a seeded LCG.
#[derive(Debug, Clone)]
pub struct FallerBag {
    columns: usize,
    upcoming: Faller,
    rng: u32,
}

impl FallerBag {
    pub fn new(columns: usize, seed: u32) -> Self {
        let mut b = Self {
            columns: columns.max(1),
            upcoming: Faller {
                column: 0,
                jewels: [Jewel::S; 3],
            },
            rng: seed,
        };
        b.upcoming = b.roll();
        b
    }

    fn next_rand(&mut self) -> u32 {
        self.rng = self.rng.wrapping_mul(1103515245).wrapping_add(12345);
        self.rng >> 16
    }

    fn roll(&mut self) -> Faller {
        let column = self.next_rand() as usize % self.columns;
        let mut jewels = [Jewel::S; 3];
        for jewel in &mut jewels {
            *jewel = Jewel::ALL[self.next_rand() as usize % Jewel::ALL.len()];
        }
        Faller { column, jewels }
    }

    /// The faller `next()` will return.
    pub fn peek(&self) -> &Faller {
        &self.upcoming
    }

    pub fn next(&mut self) -> Faller {
        let following = self.roll();
        std::mem::replace(&mut self.upcoming, following)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC: [Jewel; 3] = [Jewel::S, Jewel::T, Jewel::V];

    fn faller(column: usize) -> Faller {
        Faller {
            column,
            jewels: ABC,
        }
    }

    fn stack(field: &mut Field, x: usize, count: usize) {
        let bottom = field.height() - 1;
        for y in (bottom + 1 - count)..=bottom {
            field.set(x, y, Cell::Frozen(Jewel::Z));
        }
    }

    fn active_jewels(field: &Field, x: usize) -> Vec<Cell> {
        field
            .column(x)
            .unwrap()
            .iter()
            .copied()
            .filter(|c| c.is_active())
            .collect()
    }

    #[test]
    fn test_drop_into_empty_column() {
        let mut field = Field::new(6, 3).unwrap();
        field.drop_faller(faller(1)).unwrap();
        assert_eq!(field.get(1, 1), Some(Cell::Falling(Jewel::S)));
        assert_eq!(field.get(1, 2), Some(Cell::Falling(Jewel::T)));
        assert_eq!(field.get(1, 3), Some(Cell::Falling(Jewel::V)));
        assert_eq!(field.get(1, 0), Some(Cell::Empty));
        assert_eq!(field.get(1, 4), Some(Cell::Empty));
        assert_eq!(field.active_column(), Some(1));
    }

    #[test]
    fn test_drop_onto_stack_lands_immediately() {
        let mut field = Field::new(6, 3).unwrap();
        stack(&mut field, 0, 5);
        field.drop_faller(faller(0)).unwrap();
        assert_eq!(
            active_jewels(&field, 0),
            vec![
                Cell::Landed(Jewel::S),
                Cell::Landed(Jewel::T),
                Cell::Landed(Jewel::V)
            ]
        );
        assert_eq!(field.get(0, 3), Some(Cell::Landed(Jewel::V)));
    }

    #[test]
    fn test_drop_into_full_column_is_offset_and_landed() {
        let mut field = Field::new(6, 3).unwrap();
        stack(&mut field, 2, 6);
        field.drop_faller(faller(2)).unwrap();
        assert_eq!(field.get(2, 0), Some(Cell::Landed(Jewel::S)));
        assert_eq!(field.get(2, 1), Some(Cell::Landed(Jewel::T)));
        assert_eq!(field.get(2, 2), Some(Cell::Landed(Jewel::V)));
        assert_eq!(field.get(2, 3), Some(Cell::Frozen(Jewel::Z)));
    }

    #[test]
    fn test_drop_column_out_of_range() {
        let mut field = Field::new(6, 3).unwrap();
        assert_eq!(
            field.drop_faller(faller(3)),
            Err(EngineError::ColumnOutOfRange {
                column: 3,
                columns: 3
            })
        );
    }

    #[test]
    fn test_rotate_cycles_back_after_three() {
        let mut field = Field::new(6, 1).unwrap();
        field.drop_faller(faller(0)).unwrap();

        assert!(field.rotate());
        assert_eq!(
            active_jewels(&field, 0),
            vec![
                Cell::Falling(Jewel::V),
                Cell::Falling(Jewel::S),
                Cell::Falling(Jewel::T)
            ]
        );
        field.rotate();
        field.rotate();
        assert_eq!(
            active_jewels(&field, 0),
            vec![
                Cell::Falling(Jewel::S),
                Cell::Falling(Jewel::T),
                Cell::Falling(Jewel::V)
            ]
        );
    }

    #[test]
    fn test_rotate_keeps_landed_tag() {
        let mut field = Field::new(6, 1).unwrap();
        stack(&mut field, 0, 5);
        field.drop_faller(faller(0)).unwrap();
        field.rotate();
        assert_eq!(field.get(0, 1), Some(Cell::Landed(Jewel::V)));
    }

    #[test]
    fn test_rotate_without_faller_is_noop() {
        let mut field = Field::new(6, 2).unwrap();
        stack(&mut field, 0, 2);
        let before = field.clone();
        assert!(!field.rotate());
        assert_eq!(field, before);
    }

    #[test]
    fn test_move_at_edges_is_noop() {
        let mut field = Field::new(6, 3).unwrap();
        field.drop_faller(faller(0)).unwrap();
        let before = field.clone();
        assert!(!field.move_left());
        assert_eq!(field, before);

        let mut field = Field::new(6, 3).unwrap();
        field.drop_faller(faller(2)).unwrap();
        let before = field.clone();
        assert!(!field.move_right());
        assert_eq!(field, before);
    }

    #[test]
    fn test_move_into_occupied_column_is_noop() {
        let mut field = Field::new(6, 3).unwrap();
        stack(&mut field, 0, 6);
        field.drop_faller(faller(1)).unwrap();
        let before = field.clone();
        assert!(!field.move_left());
        assert_eq!(field, before);
    }

    #[test]
    fn test_move_shifts_whole_group() {
        let mut field = Field::new(6, 3).unwrap();
        stack(&mut field, 0, 2);
        field.drop_faller(faller(1)).unwrap();

        assert!(field.move_right());
        assert!(active_jewels(&field, 1).is_empty());
        assert_eq!(active_jewels(&field, 2).len(), 3);
        assert!(field.move_left());
        assert!(field.move_left());
        assert_eq!(active_jewels(&field, 0).len(), 3);
        assert_eq!(field.settled_height(0), 2);
        assert_eq!(field.active_column(), Some(0));
    }

    #[test]
    fn test_move_recomputes_landing() {
        let mut field = Field::new(6, 2).unwrap();
        stack(&mut field, 0, 5);
        stack(&mut field, 1, 2);
        field.drop_faller(faller(0)).unwrap();
        assert_eq!(field.get(0, 3), Some(Cell::Landed(Jewel::V)));

        // Column 1 has room underneath, so the group falls again.
        assert!(field.move_right());
        assert_eq!(field.get(1, 3), Some(Cell::Falling(Jewel::V)));

        // Back over the tall stack it is landed once more.
        assert!(field.move_left());
        assert_eq!(field.get(0, 3), Some(Cell::Landed(Jewel::V)));
    }

    #[test]
    fn test_bag_is_deterministic() {
        let mut a = FallerBag::new(6, 42);
        let mut b = FallerBag::new(6, 42);
        for _ in 0..20 {
            let peeked = *a.peek();
            let f = a.next();
            assert_eq!(f, peeked);
            assert_eq!(f, b.next());
            assert!(f.column < 6);
        }
    }
}
