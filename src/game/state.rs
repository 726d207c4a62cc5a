use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::board::Property;
use crate::game::config::ConfigError;
use crate::game::players::{LedgerError, PlayerState};
use crate::types::FinishReason;

/// Read-only view of a match handed to decision sources and loggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: Vec<PlayerState>,
    pub properties: Vec<Property>,
    pub round: u32,
    pub current_player: usize,
    /// Amount being collected while the current player liquidates assets.
    pub charge: Option<i64>,
    pub sell_offer_tries: u32,
    pub buy_offer_tries: u32,
    pub std_actions_used: u32,
}

impl GameSnapshot {
    pub fn player(&self, id: usize) -> Option<&PlayerState> {
        self.players.get(id)
    }

    pub fn property(&self, id: usize) -> Option<&Property> {
        self.properties.get(id)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &PlayerState> + '_ {
        self.players.iter().filter(|p| p.is_active())
    }
}

impl fmt::Display for GameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(77);
        writeln!(f, "{rule}")?;
        writeln!(f, "  ROUND {} | PLAYER {}", self.round, self.current_player)?;
        if let Some(charge) = self.charge {
            writeln!(f, "  PENDING CHARGE {charge}$")?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "PLAYERS:")?;
        for player in &self.players {
            let status = if player.is_bankrupt {
                "DEAD"
            } else if player.is_jailed {
                "JAIL"
            } else {
                "----"
            };
            writeln!(
                f,
                "{} {} {} {}$ {}card field{} [{}]",
                player.id,
                player.name,
                status,
                player.money,
                player.jail_cards,
                player.position,
                player.properties.iter().join(",")
            )?;
        }
        writeln!(f, "PROPERTIES:")?;
        for property in &self.properties {
            let owner = property
                .owner
                .and_then(|id| self.players.get(id))
                .map(|p| p.name.as_str())
                .unwrap_or("-------");
            writeln!(
                f,
                "field{:<2} property{:<2} {:<22} {:<10} {} {}House {} {}$ {}$",
                property.field_index,
                property.property_index,
                property.name,
                owner,
                if property.is_mortgaged { "MORTGAGED" } else { "---------" },
                property.houses,
                property.set,
                property.price,
                property.house_price
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub reason: FinishReason,
    pub winner: Option<usize>,
    pub rounds: u32,
}

/// Cooperative cancellation flag shared between a running match and whoever
/// orchestrates it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Faults that abort a whole match. Rule violations by a decision source are
/// never reported here; they forfeit the offending player instead.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("game cancelled")]
    Cancelled,
    #[error("game already finished")]
    GameFinished,
    #[error("player count must be between 2 and 4, got {0}")]
    PlayerCount(usize),
    #[error(transparent)]
    Settings(#[from] ConfigError),
    #[error("ledger invariant violated: {0}")]
    Ledger(#[from] LedgerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn snapshot_dump_lists_players_and_owners() {
        let mut alice = PlayerState::new(0, "alice", 1500).unwrap();
        alice.add_property(0).unwrap();
        let mut property =
            Property::new(1, 0, "Mediterranean Avenue", 60, 50, crate::types::PropertySet::Brown)
                .unwrap();
        property.owner = Some(0);
        let snapshot = GameSnapshot {
            players: vec![alice],
            properties: vec![property],
            round: 3,
            current_player: 0,
            charge: Some(80),
            sell_offer_tries: 0,
            buy_offer_tries: 0,
            std_actions_used: 0,
        };
        let dump = snapshot.to_string();
        assert!(dump.contains("ROUND 3 | PLAYER 0"));
        assert!(dump.contains("PENDING CHARGE 80$"));
        assert!(dump.contains("0 alice ---- 1500$ 0card field0 [0]"));
        assert!(dump.contains("Mediterranean Avenue"));
        assert_eq!(snapshot.active_players().count(), 1);
    }
}
