//! Observability port for the engine. Implementations must not influence
//! game semantics; the engine never reads anything back from a logger.

use uuid::Uuid;

use crate::game::GameSnapshot;

pub trait GameLogger {
    /// Called once by `Game::new` with the id of the match being logged.
    fn bind_game(&mut self, _game_id: Uuid) {}

    fn log(&mut self, message: &str);
    fn log_state(&mut self, state: &GameSnapshot);
    fn error(&mut self, message: &str, state: &GameSnapshot);
}

/// Forwards engine events to `tracing`, tagged with the match id.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    game_id: Option<Uuid>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_game(game_id: Uuid) -> Self {
        Self {
            game_id: Some(game_id),
        }
    }

    pub fn game_id(&self) -> Option<Uuid> {
        self.game_id
    }
}

impl GameLogger for TracingLogger {
    fn bind_game(&mut self, game_id: Uuid) {
        self.game_id = Some(game_id);
    }

    fn log(&mut self, message: &str) {
        tracing::info!(game = ?self.game_id, "{message}");
    }

    fn log_state(&mut self, state: &GameSnapshot) {
        tracing::debug!(
            game = ?self.game_id,
            round = state.round,
            player = state.current_player,
            "\n{state}"
        );
    }

    fn error(&mut self, message: &str, state: &GameSnapshot) {
        tracing::error!(
            game = ?self.game_id,
            round = state.round,
            player = state.current_player,
            "{message}"
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl GameLogger for NullLogger {
    fn log(&mut self, _message: &str) {}
    fn log_state(&mut self, _state: &GameSnapshot) {}
    fn error(&mut self, _message: &str, _state: &GameSnapshot) {}
}

/// Keeps every line in memory; errors are prefixed so they can be told apart.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    pub game_id: Option<Uuid>,
    pub lines: Vec<String>,
    pub states: usize,
}

impl MemoryLogger {
    pub fn errors(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines
            .iter()
            .filter_map(|line| line.strip_prefix("ERROR: "))
    }
}

impl GameLogger for MemoryLogger {
    fn bind_game(&mut self, game_id: Uuid) {
        self.game_id = Some(game_id);
    }

    fn log(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }

    fn log_state(&mut self, _state: &GameSnapshot) {
        self.states += 1;
    }

    fn error(&mut self, message: &str, _state: &GameSnapshot) {
        self.lines.push(format!("ERROR: {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::game::tests::scripted_game;
    use crate::game::{Game, GameConfig};
    use crate::players::ScriptedPlayer;

    #[test]
    fn memory_logger_separates_errors() {
        let state = scripted_game(&["a", "b"]).snapshot();
        let mut logger = MemoryLogger::default();
        logger.log("a rolled 3 + 4");
        logger.error("b forfeits", &state);
        logger.log_state(&state);

        assert_eq!(logger.lines.len(), 2);
        assert_eq!(logger.errors().collect::<Vec<_>>(), vec!["b forfeits"]);
        assert_eq!(logger.states, 1);
    }

    #[test]
    fn new_game_tags_its_logger_with_the_game_id() {
        let game = scripted_game(&["a", "b"]);
        assert_eq!(game.logger().game_id, Some(game.id));
        assert!(game.logger().lines[0].contains(&game.id.to_string()));

        let port = ScriptedPlayer::new(["a".to_string(), "b".to_string()]);
        let game = Game::new(GameConfig::with_seed(5), port, TracingLogger::new()).unwrap();
        assert_eq!(game.logger().game_id(), Some(game.id));
    }
}
