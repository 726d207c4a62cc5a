use std::collections::{BTreeMap, VecDeque};

use crate::board::PropertyIndex;
use crate::game::{ActionDetails, AvailableActions, GameOutcome, GameSnapshot};
use crate::players::base::{DecisionError, DecisionPort, DecisionResult};
use crate::types::{JailAction, StdAction};

/// Replays queued answers and falls back to passive choices once a queue runs
/// dry: no action, no purchase, no bid. Liquidation requests fall back to the
/// first offered mortgage or house sale.
///
/// Queues are shared between seats except bids, which are kept per seat.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    names: Vec<String>,
    std_actions: VecDeque<ActionDetails>,
    jail_actions: VecDeque<JailAction>,
    buy_decisions: VecDeque<bool>,
    offer_replies: VecDeque<bool>,
    bids: BTreeMap<usize, VecDeque<i64>>,
    disconnected: bool,
    /// Pending charge of every liquidation request seen, in order.
    pub liquidation_charges: Vec<i64>,
    pub finished: Vec<GameOutcome>,
}

impl ScriptedPlayer {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: names.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push_std_action(&mut self, details: ActionDetails) {
        self.std_actions.push_back(details);
    }

    pub fn push_jail_action(&mut self, action: JailAction) {
        self.jail_actions.push_back(action);
    }

    pub fn push_buy_decision(&mut self, buy: bool) {
        self.buy_decisions.push_back(buy);
    }

    /// Answer to the next sell-offer or buy-offer question.
    pub fn push_offer_reply(&mut self, accept: bool) {
        self.offer_replies.push_back(accept);
    }

    pub fn push_bid(&mut self, player: usize, bid: i64) {
        self.bids.entry(player).or_default().push_back(bid);
    }

    /// Every later decision fails as if the peer went away.
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    fn check_connected(&self) -> DecisionResult<()> {
        if self.disconnected {
            return Err(DecisionError::Disconnected);
        }
        Ok(())
    }
}

impl DecisionPort for ScriptedPlayer {
    fn init(&mut self) -> Vec<String> {
        self.names.clone()
    }

    fn std_action(
        &mut self,
        _player: usize,
        state: &GameSnapshot,
        available: &AvailableActions,
    ) -> DecisionResult<ActionDetails> {
        self.check_connected()?;
        self.liquidation_charges.extend(state.charge);
        if let Some(details) = self.std_actions.pop_front() {
            return Ok(details);
        }
        if available.offers(StdAction::NoAction) {
            return Ok(ActionDetails::no_action());
        }
        let fallback = [StdAction::Mortgage, StdAction::SellHouse]
            .into_iter()
            .find_map(|action| {
                available
                    .candidates(action)
                    .first()
                    .map(|&property| ActionDetails::new(action).with_property(property))
            });
        Ok(fallback.unwrap_or_default())
    }

    fn jail_action(
        &mut self,
        _player: usize,
        _state: &GameSnapshot,
        available: &[JailAction],
    ) -> DecisionResult<JailAction> {
        self.check_connected()?;
        if let Some(action) = self.jail_actions.pop_front() {
            return Ok(action);
        }
        let preferred = [JailAction::RollDice, JailAction::Card, JailAction::Bail];
        Ok(preferred
            .into_iter()
            .find(|action| available.contains(action))
            .unwrap_or(JailAction::Bail))
    }

    fn buy_decision(
        &mut self,
        _player: usize,
        _state: &GameSnapshot,
        _property: PropertyIndex,
    ) -> DecisionResult<bool> {
        self.check_connected()?;
        Ok(self.buy_decisions.pop_front().unwrap_or(false))
    }

    fn buy_from_player_decision(
        &mut self,
        _player: usize,
        _state: &GameSnapshot,
        _property: PropertyIndex,
        _price: i64,
    ) -> DecisionResult<bool> {
        self.check_connected()?;
        Ok(self.offer_replies.pop_front().unwrap_or(false))
    }

    fn sell_to_player_decision(
        &mut self,
        _player: usize,
        _state: &GameSnapshot,
        _property: PropertyIndex,
        _price: i64,
    ) -> DecisionResult<bool> {
        self.check_connected()?;
        Ok(self.offer_replies.pop_front().unwrap_or(false))
    }

    fn bidding_decision(
        &mut self,
        player: usize,
        _state: &GameSnapshot,
        _property: PropertyIndex,
        _current_price: i64,
        _current_leader: Option<usize>,
    ) -> DecisionResult<i64> {
        self.check_connected()?;
        Ok(self
            .bids
            .get_mut(&player)
            .and_then(VecDeque::pop_front)
            .unwrap_or(0))
    }

    fn finish(&mut self, outcome: &GameOutcome, _state: &GameSnapshot) {
        self.finished.push(*outcome);
    }
}
