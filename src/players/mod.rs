pub mod base;
pub mod heuristic;
pub mod random;
pub mod scripted;
pub mod seating;

pub use base::{DecisionError, DecisionPort, DecisionResult};
pub use heuristic::HeuristicPlayer;
pub use random::RandomPlayer;
pub use scripted::ScriptedPlayer;
pub use seating::{Seat, Seating};
