//! App: terminal init, main loop, tick and key handling.

use crate::Args;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::{Context, Result};
use columnstui::{Game, GameConfig, TickReport};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{debug, info};

/// Render at roughly 60 FPS; game ticks run on their own interval.
const FRAME_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    game: Game,
    screen: Screen,
    paused: bool,
    tick_interval: Duration,
    last_tick: Instant,
    /// TachyonFX fade over the matched jewels (rebuilt whenever a tick changes the field).
    match_effect: Option<Effect>,
    /// Last time we processed the match effect (for delta).
    match_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(args: &Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let game = Game::new(&config).context("starting game")?;
        let screen = if game.is_over() {
            Screen::GameOver
        } else {
            Screen::Playing
        };
        Ok(Self {
            config,
            theme,
            game,
            screen,
            paused: false,
            tick_interval: Duration::from_millis(args.tick_ms.max(1)),
            last_tick: Instant::now(),
            match_effect: None,
            match_effect_process_time: None,
        })
    }

    /// New game on the same well. The faller sequence moves on so restarts differ.
    fn reset_game(&mut self) -> Result<()> {
        self.config.seed = self.config.seed.wrapping_mul(69069).wrapping_add(1);
        self.game = Game::new(&self.config).context("restarting game")?;
        self.screen = if self.game.is_over() {
            Screen::GameOver
        } else {
            Screen::Playing
        };
        self.paused = false;
        self.last_tick = Instant::now();
        self.reset_match_effect();
        info!(seed = self.config.seed, "restart");
        Ok(())
    }

    fn reset_match_effect(&mut self) {
        self.match_effect = None;
        self.match_effect_process_time = None;
    }

    fn on_tick(&mut self, report: TickReport) {
        if report.matched > 0 || report.cleared > 0 {
            self.reset_match_effect();
        }
        if report.game_over {
            self.screen = Screen::GameOver;
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.game,
                    &self.theme,
                    self.paused,
                    f.area(),
                    &mut self.match_effect,
                    &mut self.match_effect_process_time,
                    now,
                )
            })?;

            let timeout = Duration::from_millis(FRAME_MS).saturating_sub(now.elapsed());

            // Input first: commands land before the tick that follows them.
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let action = key_to_action(key);
                    match (self.screen, action) {
                        (_, Action::Quit) => return Ok(()),
                        (Screen::GameOver, Action::Restart) => self.reset_game()?,
                        (Screen::Playing, Action::Pause) => {
                            self.paused = !self.paused;
                            // Resume on a fresh interval rather than ticking at once.
                            self.last_tick = Instant::now();
                        }
                        (Screen::Playing, action) if !self.paused => {
                            if let Some(command) = action.command() {
                                let changed = self.game.apply(command);
                                debug!(?command, changed, "command");
                            }
                        }
                        _ => {}
                    }
                }
            }

            if self.screen == Screen::Playing
                && !self.paused
                && self.last_tick.elapsed() >= self.tick_interval
            {
                self.last_tick = Instant::now();
                let report = self.game.tick().context("advancing game")?;
                self.on_tick(report);
            }
        }
    }
}
