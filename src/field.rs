//! Field: jewel grid, cell states, initializer and end-condition queries.

use crate::error::EngineError;
use std::fmt;

/// Hidden rows above the visible board where new fallers appear.
pub const SPAWN_ROWS: usize = 3;

/// The seven jewel identities, named by their symbol in contents files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Jewel {
    S,
    T,
    V,
    W,
    X,
    Y,
    Z,
}

impl Jewel {
    pub const ALL: [Self; 7] = [
        Self::S,
        Self::T,
        Self::V,
        Self::W,
        Self::X,
        Self::Y,
        Self::Z,
    ];

    pub fn symbol(self) -> char {
        match self {
            Self::S => 'S',
            Self::T => 'T',
            Self::V => 'V',
            Self::W => 'W',
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|j| j.symbol() == symbol)
    }

    /// Palette index 0..7 for theme.jewel_color().
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One grid cell. Every non-empty state carries its jewel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// Part of the active faller, still falling.
    Falling(Jewel),
    /// Faller touched ground this tick; can still be moved or rotated.
    Landed(Jewel),
    /// Frozen jewel flagged in a run, removed by the next clear.
    Matched(Jewel),
    /// Settled for good; the only state that takes part in matching.
    Frozen(Jewel),
}

impl Cell {
    pub fn jewel(self) -> Option<Jewel> {
        match self {
            Self::Empty => None,
            Self::Falling(j) | Self::Landed(j) | Self::Matched(j) | Self::Frozen(j) => Some(j),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    /// Falling or landed: belongs to the faller the player controls.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Falling(_) | Self::Landed(_))
    }

    /// Counted towards a column's height for the overflow check.
    #[inline]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Frozen(_) | Self::Landed(_))
    }

    /// Same jewel with a new state; `Empty` stays empty.
    pub(crate) fn retag(self, tag: fn(Jewel) -> Self) -> Self {
        self.jewel().map_or(Self::Empty, tag)
    }
}

/// Three-character form: `[X]` falling, `|X|` landed, `*X*` matched, ` X ` frozen.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Empty => f.write_str("   "),
            Self::Falling(j) => write!(f, "[{}]", j.symbol()),
            Self::Landed(j) => write!(f, "|{}|", j.symbol()),
            Self::Matched(j) => write!(f, "*{}*", j.symbol()),
            Self::Frozen(j) => write!(f, " {} ", j.symbol()),
        }
    }
}

/// (column, row); row 0 is the topmost spawn row.
pub type Position = (usize, usize);

/// One row of initial contents, left to right; `None` is a blank.
pub type ContentRow = Vec<Option<Jewel>>;

/// How a new field is populated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InitialField {
    #[default]
    Empty,
    /// Rows top-first, each exactly one entry per column.
    Contents(Vec<ContentRow>),
}

/// Playfield: `columns[x][y]`, x left to right, y top to bottom, spawn rows first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    rows: usize,
    columns: Vec<Vec<Cell>>,
}

/// Build a field of `rows` visible rows and `columns` columns.
pub fn create_field(
    rows: usize,
    columns: usize,
    initial: &InitialField,
) -> Result<Field, EngineError> {
    match initial {
        InitialField::Empty => Field::new(rows, columns),
        InitialField::Contents(contents) => Field::with_contents(rows, columns, contents),
    }
}

/// Parse contents lines (top row first). A space is a blank cell.
pub fn parse_contents<S: AsRef<str>>(lines: &[S]) -> Result<Vec<ContentRow>, EngineError> {
    lines
        .iter()
        .enumerate()
        .map(|(row, line)| {
            line.as_ref()
                .chars()
                .enumerate()
                .map(|(column, symbol)| match symbol {
                    ' ' => Ok(None),
                    _ => Jewel::from_symbol(symbol)
                        .map(Some)
                        .ok_or(EngineError::UnknownJewel {
                            row,
                            column,
                            symbol,
                        }),
                })
                .collect()
        })
        .collect()
}

impl Field {
    /// Empty field with `rows` visible rows plus the spawn rows.
    pub fn new(rows: usize, columns: usize) -> Result<Self, EngineError> {
        if rows < 1 || columns < 1 {
            return Err(EngineError::InvalidDimensions { rows, columns });
        }
        Ok(Self {
            rows,
            columns: vec![vec![Cell::Empty; rows + SPAWN_ROWS]; columns],
        })
    }

    /// Field pre-populated with frozen jewels; blanks are squeezed out by gravity.
    pub fn with_contents(
        rows: usize,
        columns: usize,
        contents: &[ContentRow],
    ) -> Result<Self, EngineError> {
        let mut field = Self::new(rows, columns)?;
        if let Some((row, bad)) = contents
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns)
        {
            return Err(EngineError::malformed(format!(
                "row {row} has {} entries, expected {columns}",
                bad.len()
            )));
        }
        let height = field.height();
        if contents.len() > height {
            return Err(EngineError::malformed(format!(
                "{} rows do not fit a field {height} cells tall",
                contents.len()
            )));
        }

        let top = height - contents.len();
        for (dy, row) in contents.iter().enumerate() {
            for (x, jewel) in row.iter().enumerate() {
                if let Some(j) = jewel {
                    field.columns[x][top + dy] = Cell::Frozen(*j);
                }
            }
        }
        field.compact();
        Ok(field)
    }

    /// Number of visible rows (excludes spawn rows).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total cells per column, spawn rows included.
    #[inline]
    pub fn height(&self) -> usize {
        self.rows + SPAWN_ROWS
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn get(&self, column: usize, row: usize) -> Option<Cell> {
        self.columns.get(column).and_then(|c| c.get(row)).copied()
    }

    /// Overwrite a cell. Out-of-range positions are ignored. No invariant checks:
    /// meant for building fixtures, the game itself only uses the operations.
    pub fn set(&mut self, column: usize, row: usize, cell: Cell) {
        if let Some(slot) = self.columns.get_mut(column).and_then(|c| c.get_mut(row)) {
            *slot = cell;
        }
    }

    pub fn column(&self, index: usize) -> Option<&[Cell]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub(crate) fn columns(&self) -> &[Vec<Cell>] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Vec<Cell>] {
        &mut self.columns
    }

    /// Every cell with its position, column by column.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.columns.iter().enumerate().flat_map(|(x, col)| {
            col.iter().enumerate().map(move |(y, cell)| ((x, y), *cell))
        })
    }

    /// Column holding the faller (falling or landed cells), if any.
    pub fn active_column(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.iter().any(|c| c.is_active()))
    }

    /// Row of the lowest active cell in `column`.
    pub(crate) fn lowest_active_row(&self, column: usize) -> Option<usize> {
        self.columns
            .get(column)?
            .iter()
            .rposition(|c| c.is_active())
    }

    /// True if some jewel is flagged and waiting for a clear.
    pub fn has_matches(&self) -> bool {
        self.columns
            .iter()
            .flatten()
            .any(|c| matches!(c, Cell::Matched(_)))
    }

    /// A new faller may spawn only when nothing is falling, landed or matched.
    pub fn ready_for_faller(&self) -> bool {
        self.columns
            .iter()
            .flatten()
            .all(|c| matches!(c, Cell::Empty | Cell::Frozen(_)))
    }

    /// Frozen plus landed jewels in `column`.
    pub fn settled_height(&self, column: usize) -> usize {
        self.columns
            .get(column)
            .map_or(0, |col| col.iter().filter(|c| c.is_settled()).count())
    }

    /// Game over: no pending matches and some column has grown past the visible rows.
    pub fn is_game_over(&self) -> bool {
        !self.has_matches() && (0..self.width()).any(|x| self.settled_height(x) > self.rows)
    }
}

/// Visible rows in the three-character cell form, framed like `| X  [Y]|`.
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in SPAWN_ROWS..self.height() {
            f.write_str("|")?;
            for col in &self.columns {
                write!(f, "{}", col[y])?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, " {} ", "---".repeat(self.width()))
    }
}
