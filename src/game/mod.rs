pub mod action;
pub mod auction;
pub mod bank;
pub mod config;
pub mod fields;
pub mod game;
pub mod negotiation;
pub mod players;
pub mod rng;
pub mod state;

pub use action::{ActionDetails, AvailableActions, TargetPlayers};
pub use config::{ConfigError, GameConfig, GameSettings};
pub use game::Game;
pub use players::{LedgerError, PlayerState};
pub use rng::{Dice, GameRng};
pub use state::{CancelToken, GameError, GameOutcome, GameSnapshot};
