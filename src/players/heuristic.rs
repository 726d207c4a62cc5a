//! Rule-of-thumb bot: keeps a cash reserve, completes color sets, builds on
//! them and sheds lone properties when money runs low.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::board::PropertyIndex;
use crate::game::{ActionDetails, AvailableActions, GameOutcome, GameSnapshot};
use crate::players::base::{DecisionPort, DecisionResult};
use crate::types::{JailAction, PropertySet, StdAction};

/// Cash the bot tries never to dip below.
const RESERVE: i64 = 200;
/// Below this the bot starts raising money.
const LOW_CASH: i64 = 300;
/// After this round the bot sits in jail rather than paying out.
const STAY_IN_JAIL_AFTER_ROUND: u32 = 20;

#[derive(Debug, Clone)]
pub struct HeuristicPlayer {
    names: Vec<String>,
    rng: ChaCha8Rng,
}

/// Per color set, which members `player` holds and which it is missing.
#[derive(Debug, Default)]
struct SetView {
    have: BTreeMap<PropertySet, Vec<PropertyIndex>>,
    missing: BTreeMap<PropertySet, Vec<PropertyIndex>>,
}

impl SetView {
    fn new(state: &GameSnapshot, player: usize) -> Self {
        let mut view = SetView::default();
        for property in state.properties.iter().filter(|p| p.set.is_color()) {
            view.have.entry(property.set).or_default();
            let bucket = if property.is_owned_by(player) {
                view.have.entry(property.set).or_default()
            } else {
                view.missing.entry(property.set).or_default()
            };
            bucket.push(property.property_index);
        }
        view
    }

    /// The single property that would complete a set.
    fn key_properties(&self) -> Vec<PropertyIndex> {
        self.missing
            .values()
            .filter(|members| members.len() == 1)
            .map(|members| members[0])
            .collect()
    }

    /// Lone holdings in sets worth breaking up. The two-member corner sets
    /// are cheap to complete, so they are kept.
    fn unwanted(&self) -> Vec<PropertyIndex> {
        self.have
            .iter()
            .filter(|(set, members)| {
                members.len() == 1 && !matches!(set, PropertySet::DarkBlue | PropertySet::Brown)
            })
            .map(|(_, members)| members[0])
            .collect()
    }

    fn full_sets(&self) -> Vec<PropertyIndex> {
        self.have
            .iter()
            .filter(|(set, members)| {
                !members.is_empty() && self.missing.get(set).is_none_or(Vec::is_empty)
            })
            .flat_map(|(_, members)| members.iter().copied())
            .collect()
    }
}

impl HeuristicPlayer {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            names: vec![name.into()],
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn with_seats(count: usize, seed: u64) -> Self {
        Self {
            names: (0..count).map(|idx| format!("heuristic-{idx}")).collect(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Raise cash for a pending charge: houses go first, then lone
    /// properties, then anything mortgageable.
    fn liquidate(view: &SetView, available: &AvailableActions) -> ActionDetails {
        if let Some(&property) = available.sell_house.first() {
            return ActionDetails::new(StdAction::SellHouse).with_property(property);
        }
        let unwanted = view.unwanted();
        let mortgage = available
            .mortgage
            .iter()
            .find(|p| unwanted.contains(p))
            .or_else(|| available.mortgage.first());
        match mortgage {
            Some(&property) => ActionDetails::new(StdAction::Mortgage).with_property(property),
            None => ActionDetails::no_action(),
        }
    }
}

impl DecisionPort for HeuristicPlayer {
    fn init(&mut self) -> Vec<String> {
        self.names.clone()
    }

    fn std_action(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        available: &AvailableActions,
    ) -> DecisionResult<ActionDetails> {
        let view = SetView::new(state, player);
        if state.charge.is_some() || !available.offers(StdAction::NoAction) {
            return Ok(Self::liquidate(&view, available));
        }
        let cash = state.player(player).map_or(0, |p| p.money);
        let price_of = |property: PropertyIndex| state.property(property).map_or(0, |p| p.price);
        let mut need_money = cash < LOW_CASH;

        if let Some(&property) = available.buy_house.choose(&mut self.rng) {
            let house_price = state.property(property).map_or(0, |p| p.house_price);
            if cash - house_price >= RESERVE {
                return Ok(ActionDetails::new(StdAction::BuyHouse).with_property(property));
            }
            need_money = true;
        }

        for property in view.full_sets() {
            if !available.buyout.contains(&property) {
                continue;
            }
            if cash - price_of(property) * 11 / 10 >= RESERVE {
                return Ok(ActionDetails::new(StdAction::Buyout).with_property(property));
            }
            need_money = true;
        }

        if available.offers(StdAction::BuyOffer) {
            for property in view.key_properties() {
                if !available.buy_property.contains(&property) {
                    continue;
                }
                let price = price_of(property) / 2;
                if cash - price >= RESERVE {
                    return Ok(ActionDetails::new(StdAction::BuyOffer)
                        .with_property(property)
                        .with_price(price));
                }
                need_money = true;
            }
        }

        if need_money {
            if let Some(&property) = view.unwanted().choose(&mut self.rng) {
                if available.offers(StdAction::SellOffer)
                    && available.sell_property.contains(&property)
                {
                    let targets: Vec<usize> = state
                        .active_players()
                        .map(|p| p.id)
                        .filter(|&id| id != player)
                        .collect();
                    return Ok(ActionDetails::new(StdAction::SellOffer)
                        .with_property(property)
                        .with_price(price_of(property) * 3 / 2)
                        .with_targets(targets));
                }
                if available.mortgage.contains(&property) {
                    return Ok(ActionDetails::new(StdAction::Mortgage).with_property(property));
                }
            }
        }

        for &property in &available.buyout {
            if cash - price_of(property) * 11 / 10 >= RESERVE {
                return Ok(ActionDetails::new(StdAction::Buyout).with_property(property));
            }
        }

        // Asking for a property for free costs nothing but the offer try.
        if available.offers(StdAction::BuyOffer) {
            if let Some(&property) = available.buy_property.choose(&mut self.rng) {
                return Ok(ActionDetails::new(StdAction::BuyOffer)
                    .with_property(property)
                    .with_price(0));
            }
        }

        Ok(ActionDetails::no_action())
    }

    fn jail_action(
        &mut self,
        _player: usize,
        state: &GameSnapshot,
        available: &[JailAction],
    ) -> DecisionResult<JailAction> {
        let can_roll = available.contains(&JailAction::RollDice);
        if can_roll && state.round > STAY_IN_JAIL_AFTER_ROUND {
            return Ok(JailAction::RollDice);
        }
        if available.contains(&JailAction::Card) {
            return Ok(JailAction::Card);
        }
        Ok(JailAction::Bail)
    }

    fn buy_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
    ) -> DecisionResult<bool> {
        let cash = state.player(player).map_or(0, |p| p.money);
        let price = state.property(property).map_or(i64::MAX, |p| p.price);
        Ok(cash - price >= RESERVE)
    }

    fn buy_from_player_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        price: i64,
    ) -> DecisionResult<bool> {
        let cash = state.player(player).map_or(0, |p| p.money);
        let list_price = state.property(property).map_or(0, |p| p.price);
        if cash - price < RESERVE {
            return Ok(false);
        }
        if price < list_price {
            return Ok(true);
        }
        let key = SetView::new(state, player).key_properties().contains(&property);
        Ok(key && price <= 2 * list_price)
    }

    fn sell_to_player_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        price: i64,
    ) -> DecisionResult<bool> {
        let view = SetView::new(state, player);
        if view.full_sets().contains(&property) {
            return Ok(false);
        }
        let list_price = state.property(property).map_or(0, |p| p.price);
        if view.unwanted().contains(&property) && price > list_price {
            return Ok(true);
        }
        Ok(price > 2 * list_price)
    }

    fn bidding_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        current_price: i64,
        _current_leader: Option<usize>,
    ) -> DecisionResult<i64> {
        let cash = state.player(player).map_or(0, |p| p.money);
        if cash - current_price < RESERVE {
            return Ok(0);
        }
        if SetView::new(state, player).key_properties().contains(&property) {
            return Ok(current_price + 10);
        }
        let list_price = state.property(property).map_or(0, |p| p.price);
        if current_price < list_price {
            return Ok(current_price + 1);
        }
        Ok(0)
    }

    fn finish(&mut self, _outcome: &GameOutcome, _state: &GameSnapshot) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::game::PlayerState;

    fn state_with(owned: &[(PropertyIndex, usize)]) -> GameSnapshot {
        let mut properties = Board::standard().unwrap().initial_properties();
        let mut players = vec![
            PlayerState::new(0, "a", 1500).unwrap(),
            PlayerState::new(1, "b", 1500).unwrap(),
        ];
        for &(property, owner) in owned {
            properties[property].owner = Some(owner);
            players[owner].add_property(property).unwrap();
        }
        GameSnapshot {
            players,
            properties,
            round: 1,
            current_player: 0,
            charge: None,
            sell_offer_tries: 0,
            buy_offer_tries: 0,
            std_actions_used: 0,
        }
    }

    #[test]
    fn set_view_finds_key_and_unwanted_properties() {
        // Brown complete, one of three light blues, two of three pinks.
        let state = state_with(&[(0, 0), (1, 0), (3, 0), (6, 0), (8, 0)]);
        let view = SetView::new(&state, 0);
        assert_eq!(view.full_sets(), vec![0, 1]);
        assert_eq!(view.key_properties(), vec![9]);
        assert_eq!(view.unwanted(), vec![3]);
    }

    #[test]
    fn keeps_a_cash_reserve_when_buying() {
        let mut bot = HeuristicPlayer::new("bot", 1);
        let mut state = state_with(&[]);
        assert!(bot.buy_decision(0, &state, 27).unwrap());
        state.players[0].money = 550;
        assert!(!bot.buy_decision(0, &state, 27).unwrap());
    }

    #[test]
    fn bids_hard_for_set_completing_property() {
        let mut bot = HeuristicPlayer::new("bot", 1);
        let state = state_with(&[(26, 0)]);
        assert_eq!(bot.bidding_decision(0, &state, 27, 500, Some(1)).unwrap(), 510);
        assert_eq!(bot.bidding_decision(0, &state, 3, 50, Some(1)).unwrap(), 51);
        assert_eq!(bot.bidding_decision(0, &state, 3, 100, Some(1)).unwrap(), 0);
    }

    #[test]
    fn liquidates_lone_properties_first() {
        let mut bot = HeuristicPlayer::new("bot", 1);
        let mut state = state_with(&[(0, 0), (1, 0), (11, 0)]);
        state.charge = Some(400);
        let available = AvailableActions {
            actions: vec![StdAction::Mortgage],
            mortgage: vec![0, 1, 11],
            ..AvailableActions::default()
        };
        let details = bot.std_action(0, &state, &available).unwrap();
        assert_eq!(details, ActionDetails::new(StdAction::Mortgage).with_property(11));
    }

    #[test]
    fn never_sells_from_a_full_set() {
        let mut bot = HeuristicPlayer::new("bot", 1);
        let state = state_with(&[(0, 0), (1, 0)]);
        assert!(!bot.sell_to_player_decision(0, &state, 0, 10_000).unwrap());
    }
}
