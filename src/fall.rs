//! Landing and freezing: one row of gravity per tick for the faller.
//!
//! A faller moves `Falling -> Landed` on the tick it comes to rest and
//! `Landed -> Frozen` on the next tick in which nothing on the field moved.
//! That extra tick is the window in which a landed faller can still be moved
//! or rotated.

use crate::field::{Cell, Field};
use tracing::{debug, trace};

/// What a call to [`Field::fall`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallStep {
    /// Nothing to move and nothing to freeze.
    #[default]
    Idle,
    /// The faller dropped one row and is still falling.
    Moved,
    /// The faller came to rest this tick.
    Landed,
    /// A landed faller became part of the frozen stack.
    Froze,
}

impl Field {
    /// Advance the falling group by one row, landing it when it hits something.
    /// If the field is unchanged afterwards, landed jewels freeze.
    pub fn fall(&mut self) -> FallStep {
        let previous = self.clone();
        let mut step = FallStep::Idle;

        for x in 0..self.width() {
            if !self.columns()[x].iter().any(|c| matches!(c, Cell::Falling(_))) {
                continue;
            }
            if !self.is_grounded(x) {
                self.step_down(x);
                step = FallStep::Moved;
            }
            if self.is_grounded(x) {
                self.land(x);
                step = FallStep::Landed;
            }
        }

        if self.freeze_if_unchanged(&previous) {
            step = FallStep::Froze;
        }
        trace!(?step, "fall");
        step
    }

    /// True if the lowest active cell of `column` sits on the floor or on another jewel.
    pub(crate) fn is_grounded(&self, column: usize) -> bool {
        let Some(lowest) = self.lowest_active_row(column) else {
            return false;
        };
        self.get(column, lowest + 1).is_none_or(|below| !below.is_empty())
    }

    /// Turn the falling cells of `column` into landed ones.
    pub(crate) fn land(&mut self, column: usize) {
        if let Some(col) = self.columns_mut().get_mut(column) {
            for cell in col.iter_mut() {
                if let Cell::Falling(j) = *cell {
                    *cell = Cell::Landed(j);
                }
            }
            debug!(column, "faller landed");
        }
    }

    /// Shift everything above the frozen stack down one row.
    fn step_down(&mut self, column: usize) {
        let col = &mut self.columns_mut()[column];
        let (mut moving, frozen): (Vec<Cell>, Vec<Cell>) = col
            .iter()
            .copied()
            .partition(|c| !matches!(c, Cell::Frozen(_)));
        moving.rotate_right(1);
        moving.extend(frozen);
        *col = moving;
    }

    /// Freeze every landed jewel if nothing changed since `previous`.
    pub(crate) fn freeze_if_unchanged(&mut self, previous: &Field) -> bool {
        if *self != *previous {
            return false;
        }
        let mut froze = false;
        for cell in self.columns_mut().iter_mut().flatten() {
            if let Cell::Landed(j) = *cell {
                *cell = Cell::Frozen(j);
                froze = true;
            }
        }
        if froze {
            debug!("faller froze");
        }
        froze
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faller::Faller;
    use crate::field::Jewel;

    const ABC: [Jewel; 3] = [Jewel::S, Jewel::T, Jewel::V];

    #[test]
    fn test_fall_moves_one_row() {
        let mut field = Field::new(4, 2).unwrap();
        field
            .drop_faller(Faller {
                column: 1,
                jewels: ABC,
            })
            .unwrap();
        assert_eq!(field.fall(), FallStep::Moved);
        assert_eq!(field.get(1, 1), Some(Cell::Empty));
        assert_eq!(field.get(1, 2), Some(Cell::Falling(Jewel::S)));
        assert_eq!(field.get(1, 4), Some(Cell::Falling(Jewel::V)));
    }

    #[test]
    fn test_land_then_freeze_on_next_quiet_tick() {
        // rows 2: height 5, faller starts at rows 1..=3 with one empty row below.
        let mut field = Field::new(2, 1).unwrap();
        field
            .drop_faller(Faller {
                column: 0,
                jewels: ABC,
            })
            .unwrap();

        assert_eq!(field.fall(), FallStep::Landed);
        assert_eq!(field.get(0, 4), Some(Cell::Landed(Jewel::V)));
        assert_eq!(field.get(0, 2), Some(Cell::Landed(Jewel::S)));

        assert_eq!(field.fall(), FallStep::Froze);
        assert_eq!(field.get(0, 4), Some(Cell::Frozen(Jewel::V)));
        assert!(field.ready_for_faller());

        assert_eq!(field.fall(), FallStep::Idle);
    }

    #[test]
    fn test_lands_on_frozen_jewel() {
        let mut field = Field::new(4, 1).unwrap();
        let bottom = field.height() - 1;
        field.set(0, bottom, Cell::Frozen(Jewel::Z));
        field.set(0, bottom - 1, Cell::Frozen(Jewel::Y));
        field
            .drop_faller(Faller {
                column: 0,
                jewels: ABC,
            })
            .unwrap();

        assert_eq!(field.fall(), FallStep::Landed);
        assert_eq!(field.get(0, bottom - 2), Some(Cell::Landed(Jewel::V)));
        assert_eq!(field.get(0, bottom - 1), Some(Cell::Frozen(Jewel::Y)));
    }

    #[test]
    fn test_moving_landed_faller_over_gap_resumes_falling() {
        let mut field = Field::new(4, 2).unwrap();
        let bottom = field.height() - 1;
        field.set(0, bottom, Cell::Frozen(Jewel::Z));
        field
            .drop_faller(Faller {
                column: 0,
                jewels: ABC,
            })
            .unwrap();
        assert_eq!(field.fall(), FallStep::Moved);
        assert_eq!(field.fall(), FallStep::Landed);
        assert_eq!(field.get(0, bottom - 1), Some(Cell::Landed(Jewel::V)));

        // Grace tick: slide off the stack before it freezes.
        assert!(field.move_right());
        assert_eq!(field.get(1, bottom - 1), Some(Cell::Falling(Jewel::V)));
        assert_eq!(field.fall(), FallStep::Landed);
        assert_eq!(field.get(1, bottom), Some(Cell::Landed(Jewel::V)));
        assert_eq!(field.fall(), FallStep::Froze);
        assert_eq!(field.settled_height(0), 1);
        assert_eq!(field.settled_height(1), 3);
    }

    #[test]
    fn test_rotation_during_grace_tick_still_freezes() {
        let mut field = Field::new(2, 1).unwrap();
        field
            .drop_faller(Faller {
                column: 0,
                jewels: ABC,
            })
            .unwrap();
        assert_eq!(field.fall(), FallStep::Landed);
        field.rotate();
        assert_eq!(field.fall(), FallStep::Froze);
        assert_eq!(field.get(0, 2), Some(Cell::Frozen(Jewel::V)));
    }
}
