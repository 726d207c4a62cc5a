#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod cli;
pub mod game;
pub mod logging;
pub mod players;
pub mod remote;
pub mod types;

pub use board::{Board, Field, Property};
pub use game::{CancelToken, Game, GameConfig, GameError, GameOutcome, GameSettings, GameSnapshot};
pub use logging::{GameLogger, MemoryLogger, NullLogger, TracingLogger};
pub use players::{DecisionError, DecisionPort};
pub use types::{FinishReason, JailAction, PropertySet, StdAction};
