use std::collections::HashMap;
use std::time::Duration;

use crate::game::{Game, GameOutcome};
use crate::logging::GameLogger;
use crate::players::DecisionPort;
use crate::types::FinishReason;

#[derive(Debug, Default, Clone)]
pub struct GameStats {
    pub wins: HashMap<usize, u32>,
    pub net_worth_by_seat: HashMap<usize, Vec<i64>>,
    pub games: u32,
    pub draws: u32,
    pub round_limit_finishes: u32,
    pub total_rounds: u64,
    pub total_duration: Duration,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game<D: DecisionPort, L: GameLogger>(
        &mut self,
        game: &Game<D, L>,
        outcome: &GameOutcome,
        duration: Duration,
    ) {
        self.games += 1;
        self.total_duration += duration;
        self.total_rounds += u64::from(outcome.rounds);
        match outcome.reason {
            FinishReason::Draw => self.draws += 1,
            FinishReason::RoundLimit => self.round_limit_finishes += 1,
            FinishReason::Win => {}
        }
        if let Some(winner) = outcome.winner {
            *self.wins.entry(winner).or_insert(0) += 1;
        }
        for player in game.players() {
            let worth = if player.is_bankrupt { 0 } else { game.net_worth(player.id) };
            self.net_worth_by_seat
                .entry(player.id)
                .or_default()
                .push(worth);
        }
    }

    pub fn merge(&mut self, other: GameStats) {
        for (seat, wins) in other.wins {
            *self.wins.entry(seat).or_insert(0) += wins;
        }
        for (seat, worth) in other.net_worth_by_seat {
            self.net_worth_by_seat.entry(seat).or_default().extend(worth);
        }
        self.games += other.games;
        self.draws += other.draws;
        self.round_limit_finishes += other.round_limit_finishes;
        self.total_rounds += other.total_rounds;
        self.total_duration += other.total_duration;
    }

    pub fn win_rate(&self, seat: usize) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let wins = self.wins.get(&seat).copied().unwrap_or(0);
        f64::from(wins) / f64::from(self.games) * 100.0
    }

    pub fn get_avg_net_worth(&self, seat: usize) -> f64 {
        match self.net_worth_by_seat.get(&seat) {
            Some(worth) if !worth.is_empty() => {
                worth.iter().sum::<i64>() as f64 / worth.len() as f64
            }
            _ => 0.0,
        }
    }

    pub fn get_avg_rounds(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_rounds as f64 / f64::from(self.games)
    }

    pub fn get_avg_duration(&self) -> Duration {
        if self.games == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.games
    }
}

#[derive(Debug, Default)]
pub struct StatisticsAccumulator {
    pub stats: GameStats,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn after<D: DecisionPort, L: GameLogger>(
        &mut self,
        game: &Game<D, L>,
        outcome: &GameOutcome,
        duration: Duration,
    ) {
        self.stats.record_game(game, outcome, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::logging::NullLogger;
    use crate::players::ScriptedPlayer;

    #[test]
    fn records_and_merges_outcomes() {
        let port = ScriptedPlayer::new(["a".to_string(), "b".to_string()]);
        let game = Game::new(GameConfig::default(), port, NullLogger).unwrap();
        let win = GameOutcome {
            reason: FinishReason::Win,
            winner: Some(1),
            rounds: 10,
        };
        let limit = GameOutcome {
            reason: FinishReason::RoundLimit,
            winner: Some(0),
            rounds: 50,
        };

        let mut first = GameStats::new();
        first.record_game(&game, &win, Duration::from_millis(4));
        let mut second = GameStats::new();
        second.record_game(&game, &limit, Duration::from_millis(6));
        first.merge(second);

        assert_eq!(first.games, 2);
        assert_eq!(first.round_limit_finishes, 1);
        assert_eq!(first.draws, 0);
        assert_eq!(first.win_rate(1), 50.0);
        assert_eq!(first.get_avg_rounds(), 30.0);
        assert_eq!(first.get_avg_duration(), Duration::from_millis(5));
        assert_eq!(first.get_avg_net_worth(0), 1500.0);
    }
}
