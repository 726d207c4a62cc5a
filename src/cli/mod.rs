pub mod players;
pub mod stats;

pub use players::{
    CLI_PLAYERS, CliError, CliPlayer, create_player, parse_seating, print_player_help,
};
pub use stats::{GameStats, StatisticsAccumulator};
