use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::PropertyIndex;
use crate::types::StdAction;

pub type TargetPlayers = SmallVec<[usize; 4]>;

/// A standard-action choice returned by a decision source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ActionDetails {
    pub action: StdAction,
    #[serde(default)]
    pub property_id: Option<PropertyIndex>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub target_player_ids: TargetPlayers,
}

impl ActionDetails {
    pub fn new(action: StdAction) -> Self {
        Self {
            action,
            property_id: None,
            price: None,
            target_player_ids: SmallVec::new(),
        }
    }

    pub fn no_action() -> Self {
        Self::new(StdAction::NoAction)
    }

    pub fn with_property(mut self, property: PropertyIndex) -> Self {
        self.property_id = Some(property);
        self
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_targets(mut self, targets: impl IntoIterator<Item = usize>) -> Self {
        self.target_player_ids = targets.into_iter().collect();
        self
    }
}

impl Default for ActionDetails {
    fn default() -> Self {
        Self::no_action()
    }
}

/// Menu offered to a decision source, with the per-action eligibility lists
/// computed from the current ownership state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailableActions {
    pub actions: Vec<StdAction>,
    pub mortgage: Vec<PropertyIndex>,
    pub buyout: Vec<PropertyIndex>,
    pub sell_property: Vec<PropertyIndex>,
    pub buy_property: Vec<PropertyIndex>,
    pub buy_house: Vec<PropertyIndex>,
    pub sell_house: Vec<PropertyIndex>,
}

impl AvailableActions {
    pub fn offers(&self, action: StdAction) -> bool {
        self.actions.contains(&action)
    }

    /// Eligibility list backing `action`; empty for NOACTION.
    pub fn candidates(&self, action: StdAction) -> &[PropertyIndex] {
        match action {
            StdAction::NoAction => &[],
            StdAction::Mortgage => &self.mortgage,
            StdAction::Buyout => &self.buyout,
            StdAction::SellOffer => &self.sell_property,
            StdAction::BuyOffer => &self.buy_property,
            StdAction::BuyHouse => &self.buy_house,
            StdAction::SellHouse => &self.sell_house,
        }
    }

    /// The reduced menu used while a player raises cash for a pending charge.
    pub fn liquidation_only(&self) -> Self {
        let mut actions = Vec::new();
        if !self.mortgage.is_empty() {
            actions.push(StdAction::Mortgage);
        }
        if !self.sell_house.is_empty() {
            actions.push(StdAction::SellHouse);
        }
        Self {
            actions,
            mortgage: self.mortgage.clone(),
            sell_house: self.sell_house.clone(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_optional_arguments() {
        let details = ActionDetails::new(StdAction::SellOffer)
            .with_property(4)
            .with_price(120)
            .with_targets([1, 3]);
        assert_eq!(details.property_id, Some(4));
        assert_eq!(details.price, Some(120));
        assert_eq!(details.target_player_ids.as_slice(), &[1, 3]);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let details: ActionDetails = serde_json::from_str(r#"{"action":"Mortgage"}"#).unwrap();
        assert_eq!(details, ActionDetails::new(StdAction::Mortgage));
    }

    #[test]
    fn liquidation_menu_keeps_only_cash_raising_actions() {
        let full = AvailableActions {
            actions: vec![StdAction::NoAction, StdAction::Mortgage, StdAction::Buyout],
            mortgage: vec![1],
            buyout: vec![2],
            sell_house: vec![],
            ..AvailableActions::default()
        };
        let reduced = full.liquidation_only();
        assert_eq!(reduced.actions, vec![StdAction::Mortgage]);
        assert!(reduced.buyout.is_empty());
        assert_eq!(reduced.candidates(StdAction::Mortgage), &[1]);
    }
}
