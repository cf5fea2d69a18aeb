//! Match detection: runs of three or more identical frozen jewels.

use crate::field::{Cell, Field, Jewel, Position};
use std::collections::HashSet;
use tracing::debug;

/// Scan directions. Every scan steps one column to the right except `Vertical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
    /// Right and down.
    DiagonalDown,
    /// Right and up.
    DiagonalUp,
}

impl Direction {
    pub const ALL: [Self; 4] = [
        Self::Horizontal,
        Self::Vertical,
        Self::DiagonalDown,
        Self::DiagonalUp,
    ];

    /// (dx, dy) per step.
    fn delta(self) -> (isize, isize) {
        match self {
            Self::Horizontal => (1, 0),
            Self::Vertical => (0, 1),
            Self::DiagonalDown => (1, 1),
            Self::DiagonalUp => (1, -1),
        }
    }

    /// The three positions starting at `from`, or `None` if the run leaves the grid's
    /// non-negative quadrant.
    fn triple(self, (x, y): Position) -> Option<[Position; 3]> {
        let (dx, dy) = self.delta();
        let step = |n: isize| Some((x.checked_add_signed(dx * n)?, y.checked_add_signed(dy * n)?));
        Some([(x, y), step(1)?, step(2)?])
    }
}

impl Field {
    fn frozen_jewel(&self, (x, y): Position) -> Option<Jewel> {
        match self.get(x, y)? {
            Cell::Frozen(j) => Some(j),
            _ => None,
        }
    }

    /// Positions of every frozen jewel that is part of a run of three or more.
    /// Longer runs come out whole because their overlapping triples are merged.
    pub fn find_matches(&self) -> HashSet<Position> {
        let mut found = HashSet::new();
        for (pos, cell) in self.cells() {
            let Cell::Frozen(jewel) = cell else {
                continue;
            };
            for dir in Direction::ALL {
                let Some(triple) = dir.triple(pos) else {
                    continue;
                };
                if triple.iter().all(|&p| self.frozen_jewel(p) == Some(jewel)) {
                    found.extend(triple);
                }
            }
        }
        found
    }

    /// Every cell currently flagged as matched.
    pub fn matched_positions(&self) -> HashSet<Position> {
        self.cells()
            .filter(|(_, cell)| matches!(cell, Cell::Matched(_)))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Flag every run as matched. Returns the positions flagged by this call.
    pub fn mark_matches(&mut self) -> HashSet<Position> {
        let found = self.find_matches();
        for &(x, y) in &found {
            if let Some(cell) = self.get(x, y) {
                self.set(x, y, cell.retag(Cell::Matched));
            }
        }
        if !found.is_empty() {
            debug!(count = found.len(), "matched jewels");
        }
        found
    }
}
