use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::board::{FieldIndex, PropertyIndex};

pub const BANKRUPT_MONEY: i64 = -1;
pub const BANKRUPT_POSITION: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: usize,
    pub name: String,
    pub money: i64,
    pub properties: BTreeSet<PropertyIndex>,
    pub position: i64,
    pub is_bankrupt: bool,
    pub is_jailed: bool,
    pub jail_cards: u32,
    pub rounds_in_jail: u32,
    pub round_when_bankrupted: Option<u32>,
}

impl PlayerState {
    pub fn new(id: usize, name: impl Into<String>, money: i64) -> Result<Self, LedgerError> {
        let name = name.into();
        if money < 0 {
            return Err(LedgerError::NegativeStartingMoney { player: name, money });
        }
        Ok(Self {
            id,
            name,
            money,
            properties: BTreeSet::new(),
            position: 0,
            is_bankrupt: false,
            is_jailed: false,
            jail_cards: 0,
            rounds_in_jail: 0,
            round_when_bankrupted: None,
        })
    }

    pub fn is_active(&self) -> bool {
        !self.is_bankrupt
    }

    /// Board index of a live player.
    pub fn field(&self) -> FieldIndex {
        self.position.max(0) as FieldIndex
    }

    pub fn set_position(&mut self, field: FieldIndex) {
        self.position = field as i64;
    }

    pub fn add_money(&mut self, amount: i64) -> Result<(), LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeAmount {
                player: self.name.clone(),
                amount,
            });
        }
        self.money += amount;
        Ok(())
    }

    pub fn remove_money(&mut self, amount: i64) -> Result<(), LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeAmount {
                player: self.name.clone(),
                amount,
            });
        }
        self.money -= amount;
        Ok(())
    }

    pub fn add_property(&mut self, property: PropertyIndex) -> Result<(), LedgerError> {
        if !self.properties.insert(property) {
            return Err(LedgerError::AlreadyOwned {
                property,
                player: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn remove_property(&mut self, property: PropertyIndex) -> Result<(), LedgerError> {
        if !self.properties.remove(&property) {
            return Err(LedgerError::NotOwned {
                property,
                player: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn jail(&mut self, jail_position: FieldIndex) {
        self.is_jailed = true;
        self.rounds_in_jail = 0;
        self.set_position(jail_position);
    }

    pub fn release(&mut self) {
        self.is_jailed = false;
        self.rounds_in_jail = 0;
    }

    /// Apply the canonical bankrupt sentinels.
    pub fn mark_bankrupt(&mut self, round: u32) {
        self.is_bankrupt = true;
        self.round_when_bankrupted = Some(round);
        self.money = BANKRUPT_MONEY;
        self.position = BANKRUPT_POSITION;
        self.is_jailed = false;
    }
}

/// Ownership and cash invariants. Any of these surfacing means the calling
/// engine code is wrong, not that a player broke a rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("player {player} cannot start with negative money {money}")]
    NegativeStartingMoney { player: String, money: i64 },
    #[error("negative amount {amount} for player {player}")]
    NegativeAmount { player: String, amount: i64 },
    #[error("property {property} has negative price {price}")]
    NegativePrice { property: PropertyIndex, price: i64 },
    #[error("property {property} already owned by {player}")]
    AlreadyOwned {
        property: PropertyIndex,
        player: String,
    },
    #[error("property {property} not owned by {player}")]
    NotOwned {
        property: PropertyIndex,
        player: String,
    },
    #[error("property {property} already has an owner")]
    PropertyTaken { property: PropertyIndex },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starts_on_go() {
        let player = PlayerState::new(1, "alice", 1500).unwrap();
        assert_eq!(player.money, 1500);
        assert_eq!(player.position, 0);
        assert!(player.properties.is_empty());
        assert!(player.is_active());
        assert_eq!(player.round_when_bankrupted, None);
    }

    #[test]
    fn negative_starting_money_is_rejected() {
        assert!(matches!(
            PlayerState::new(0, "bob", -5),
            Err(LedgerError::NegativeStartingMoney { money: -5, .. })
        ));
    }

    #[test]
    fn money_mutators_reject_negative_deltas() {
        let mut player = PlayerState::new(0, "carol", 100).unwrap();
        player.add_money(50).unwrap();
        player.remove_money(30).unwrap();
        assert_eq!(player.money, 120);
        assert!(player.add_money(-1).is_err());
        assert!(player.remove_money(-1).is_err());
        assert_eq!(player.money, 120);
    }

    #[test]
    fn property_set_rejects_duplicates_and_unknown_removals() {
        let mut player = PlayerState::new(0, "dave", 0).unwrap();
        player.add_property(3).unwrap();
        assert_eq!(
            player.add_property(3),
            Err(LedgerError::AlreadyOwned {
                property: 3,
                player: "dave".into()
            })
        );
        player.remove_property(3).unwrap();
        assert!(matches!(
            player.remove_property(3),
            Err(LedgerError::NotOwned { property: 3, .. })
        ));
    }

    #[test]
    fn bankrupt_sentinels() {
        let mut player = PlayerState::new(0, "erin", 10).unwrap();
        player.jail(10);
        player.mark_bankrupt(7);
        assert_eq!(player.money, BANKRUPT_MONEY);
        assert_eq!(player.position, BANKRUPT_POSITION);
        assert_eq!(player.round_when_bankrupted, Some(7));
        assert!(!player.is_jailed);
    }
}
