use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::PropertyIndex;
use crate::game::{ActionDetails, AvailableActions, GameOutcome, GameSnapshot};
use crate::players::base::{DecisionPort, DecisionResult};
use crate::types::{JailAction, StdAction};

/// Picks uniformly among the offered options, choosing prices that always
/// pass validation.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    names: Vec<String>,
    rng: ChaCha8Rng,
}

impl RandomPlayer {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            names: vec![name.into()],
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// One port playing every seat of a self-play match.
    pub fn with_seats(count: usize, seed: u64) -> Self {
        Self {
            names: (0..count).map(|idx| format!("random-{idx}")).collect(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn money(state: &GameSnapshot, player: usize) -> i64 {
        state.player(player).map_or(0, |p| p.money.max(0))
    }
}

impl DecisionPort for RandomPlayer {
    fn init(&mut self) -> Vec<String> {
        self.names.clone()
    }

    fn std_action(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        available: &AvailableActions,
    ) -> DecisionResult<ActionDetails> {
        let Some(&action) = available.actions.choose(&mut self.rng) else {
            return Ok(ActionDetails::no_action());
        };
        let Some(&property) = available.candidates(action).choose(&mut self.rng) else {
            return Ok(ActionDetails::new(action));
        };
        let details = ActionDetails::new(action).with_property(property);
        let list_price = state.property(property).map_or(0, |p| p.price);
        Ok(match action {
            StdAction::SellOffer => {
                let targets: Vec<usize> = state
                    .active_players()
                    .map(|p| p.id)
                    .filter(|&id| id != player)
                    .collect();
                let price = self.rng.gen_range(list_price / 2..=list_price * 2);
                details.with_price(price).with_targets(targets)
            }
            StdAction::BuyOffer => {
                let ceiling = list_price.min(Self::money(state, player));
                details.with_price(self.rng.gen_range(0..=ceiling))
            }
            _ => details,
        })
    }

    fn jail_action(
        &mut self,
        _player: usize,
        _state: &GameSnapshot,
        available: &[JailAction],
    ) -> DecisionResult<JailAction> {
        Ok(available
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(JailAction::Bail))
    }

    fn buy_decision(
        &mut self,
        _player: usize,
        _state: &GameSnapshot,
        _property: PropertyIndex,
    ) -> DecisionResult<bool> {
        Ok(self.rng.gen_bool(0.5))
    }

    fn buy_from_player_decision(
        &mut self,
        _player: usize,
        _state: &GameSnapshot,
        _property: PropertyIndex,
        _price: i64,
    ) -> DecisionResult<bool> {
        Ok(self.rng.gen_bool(0.5))
    }

    fn sell_to_player_decision(
        &mut self,
        _player: usize,
        _state: &GameSnapshot,
        _property: PropertyIndex,
        _price: i64,
    ) -> DecisionResult<bool> {
        Ok(self.rng.gen_bool(0.5))
    }

    fn bidding_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        _property: PropertyIndex,
        current_price: i64,
        _current_leader: Option<usize>,
    ) -> DecisionResult<i64> {
        let raise = current_price + self.rng.gen_range(1..=50);
        if raise > Self::money(state, player) || self.rng.gen_bool(0.5) {
            return Ok(0);
        }
        Ok(raise)
    }

    fn finish(&mut self, _outcome: &GameOutcome, _state: &GameSnapshot) {}
}
