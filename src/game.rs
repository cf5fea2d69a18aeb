//! Game state: field, faller supply, per-tick sequence, game over.

use crate::error::EngineError;
use crate::fall::FallStep;
use crate::faller::{Faller, FallerBag, Side};
use crate::field::{Field, InitialField, create_field};
use tracing::{debug, info, trace};

/// Default board size, matching the classic 13 x 6 well.
pub const DEFAULT_ROWS: usize = 13;
pub const DEFAULT_COLUMNS: usize = 6;

/// Everything needed to start a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub initial: InitialField,
    pub seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            initial: InitialField::Empty,
            seed: 0x1234_5678,
        }
    }
}

/// Player commands, applied between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
}

/// What happened during one [`Game::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub fall: FallStep,
    /// Jewels newly flagged as matched this tick.
    pub matched: usize,
    /// Jewels removed by the clear step.
    pub cleared: usize,
    pub spawned: Option<Faller>,
    pub game_over: bool,
}

#[derive(Debug, Clone)]
pub struct Game {
    field: Field,
    bag: FallerBag,
    game_over: bool,
    ticks: u64,
}

impl Game {
    /// Build the field and drop the first faller.
    ///
    /// Runs already present in pre-populated contents are flagged straight away, so
    /// they are cleared on the first tick before any faller appears.
    pub fn new(config: &GameConfig) -> Result<Self, EngineError> {
        let mut field = create_field(config.rows, config.columns, &config.initial)?;
        let flagged = field.mark_matches();
        let mut game = Self {
            bag: FallerBag::new(field.width(), config.seed),
            field,
            game_over: false,
            ticks: 0,
        };
        info!(
            rows = config.rows,
            columns = config.columns,
            seed = config.seed,
            flagged = flagged.len(),
            "new game"
        );
        if game.field.is_game_over() {
            game.finish();
        } else {
            game.spawn_if_ready()?;
        }
        Ok(game)
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The faller that spawns after the current one.
    pub fn next_faller(&self) -> &Faller {
        self.bag.peek()
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Apply a player command immediately. Returns true if the field changed.
    pub fn apply(&mut self, command: Command) -> bool {
        if self.game_over {
            return false;
        }
        match command {
            Command::MoveLeft => self.field.shift(Side::Left),
            Command::MoveRight => self.field.shift(Side::Right),
            Command::Rotate => self.field.rotate(),
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.apply(Command::MoveLeft)
    }

    pub fn move_right(&mut self) -> bool {
        self.apply(Command::MoveRight)
    }

    pub fn rotate(&mut self) -> bool {
        self.apply(Command::Rotate)
    }

    /// One timer tick: fall, match, clear what was matched on the previous tick,
    /// re-match the settled stack, then check for game over and spawn.
    pub fn tick(&mut self) -> Result<TickReport, EngineError> {
        if self.game_over {
            return Ok(TickReport {
                game_over: true,
                ..TickReport::default()
            });
        }
        self.ticks += 1;

        let pending = self.field.has_matches();
        let mut report = TickReport {
            fall: self.field.fall(),
            matched: self.field.mark_matches().len(),
            ..TickReport::default()
        };
        if pending {
            report.cleared = self.field.clear();
            report.matched += self.field.mark_matches().len();
        }

        if self.field.is_game_over() {
            self.finish();
            report.game_over = true;
        } else {
            report.spawned = self.spawn_if_ready()?;
        }
        trace!(tick = self.ticks, ?report, "tick");
        Ok(report)
    }

    fn spawn_if_ready(&mut self) -> Result<Option<Faller>, EngineError> {
        if !self.field.ready_for_faller() {
            return Ok(None);
        }
        let faller = self.bag.next();
        self.field.drop_faller(faller)?;
        debug!(column = faller.column, "spawned faller");
        Ok(Some(faller))
    }

    fn finish(&mut self) {
        self.game_over = true;
        info!(ticks = self.ticks, "game over");
    }
}
