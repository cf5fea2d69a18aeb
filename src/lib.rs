//! Columns-style jewel matching engine.
//!
//! Three stacked jewels fall into a well, can be shifted and rotated while
//! falling, freeze once they settle, and vanish when three or more identical
//! frozen jewels line up horizontally, vertically or diagonally. The crate is
//! the rule engine only; the `columnstui` binary drives it from a terminal.

pub mod clear;
pub mod error;
pub mod fall;
pub mod faller;
pub mod field;
pub mod game;
pub mod matching;

pub use error::EngineError;
pub use fall::FallStep;
pub use faller::{Faller, FallerBag, Side};
pub use field::{
    Cell, ContentRow, Field, InitialField, Jewel, Position, SPAWN_ROWS, create_field,
    parse_contents,
};
pub use game::{Command, Game, GameConfig, TickReport};
pub use matching::Direction;
