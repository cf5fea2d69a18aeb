//! columnstui: Columns-style falling-jewel puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use columnstui::{GameConfig, InitialField, parse_contents};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = game_config(&args)?;
    let mut app = App::new(&args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Columns-style puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "columnstui",
    version,
    about = "Columns-style falling-jewel puzzle in the terminal. Line up three or more identical jewels to clear them.",
    long_about = "columnstui is a terminal puzzle game in the style of Sega's Columns.\n\n\
        A faller of three stacked jewels drops into the well. Move it, cycle its jewels, \
        and let it settle. Three or more identical jewels in a row, column or diagonal \
        vanish and everything above drops down. The game ends when a column overflows.\n\n\
        CONTROLS:\n  Left/h      Move left     Right/l    Move right\n  Space/Up/k  Rotate        P          Pause\n  R           Restart       Q / Esc    Quit\n\n\
        Use --contents to start from a pre-filled well (one line per row, space for empty, \
        letters S T V W X Y Z for jewels). Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Visible rows in the well.
    #[arg(long, default_value = "13", value_name = "ROWS")]
    pub rows: usize,

    /// Columns in the well.
    #[arg(long, default_value = "6", value_name = "COLS")]
    pub columns: usize,

    /// Initial contents file: one line per row, bottom-aligned.
    #[arg(short, long, value_name = "FILE")]
    pub contents: Option<PathBuf>,

    /// Milliseconds between game ticks.
    #[arg(long, default_value = "500", value_name = "MS")]
    pub tick_ms: u64,

    /// Seed for the faller sequence. Random if not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u32>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

fn game_config(args: &Args) -> Result<GameConfig> {
    let initial = match &args.contents {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading contents file {}", path.display()))?;
            let lines: Vec<&str> = text.lines().collect();
            let rows = parse_contents(&lines)
                .with_context(|| format!("parsing contents file {}", path.display()))?;
            InitialField::Contents(rows)
        }
        None => InitialField::Empty,
    };
    Ok(GameConfig {
        rows: args.rows,
        columns: args.columns,
        initial,
        seed: args.seed.unwrap_or_else(clock_seed),
    })
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(0x1234_5678)
}

/// File logging only: the terminal belongs to the UI.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
