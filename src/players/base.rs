use crate::board::PropertyIndex;
use crate::game::{ActionDetails, AvailableActions, GameOutcome, GameSnapshot};
use crate::types::JailAction;

pub type DecisionResult<T> = Result<T, DecisionError>;

/// Everything the engine needs from the outside world. Calls are synchronous;
/// an implementation may block on a network peer or compute an answer in
/// process. Answers are validated by the engine, and an out-of-menu answer or
/// an `Err` forfeits the seat.
pub trait DecisionPort {
    fn init(&mut self) -> Vec<String>;

    fn std_action(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        available: &AvailableActions,
    ) -> DecisionResult<ActionDetails>;

    fn jail_action(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        available: &[JailAction],
    ) -> DecisionResult<JailAction>;

    fn buy_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
    ) -> DecisionResult<bool>;

    /// Asked of a sell-offer target: buy `property` from its owner at `price`?
    fn buy_from_player_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        price: i64,
    ) -> DecisionResult<bool>;

    /// Asked of an owner receiving a buy-offer: sell `property` at `price`?
    fn sell_to_player_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        price: i64,
    ) -> DecisionResult<bool>;

    /// Returns the bid; anything not above `current_price` is a pass.
    fn bidding_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        current_price: i64,
        current_leader: Option<usize>,
    ) -> DecisionResult<i64>;

    fn finish(&mut self, outcome: &GameOutcome, state: &GameSnapshot);
}

impl<P: DecisionPort + ?Sized> DecisionPort for Box<P> {
    fn init(&mut self) -> Vec<String> {
        (**self).init()
    }

    fn std_action(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        available: &AvailableActions,
    ) -> DecisionResult<ActionDetails> {
        (**self).std_action(player, state, available)
    }

    fn jail_action(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        available: &[JailAction],
    ) -> DecisionResult<JailAction> {
        (**self).jail_action(player, state, available)
    }

    fn buy_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
    ) -> DecisionResult<bool> {
        (**self).buy_decision(player, state, property)
    }

    fn buy_from_player_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        price: i64,
    ) -> DecisionResult<bool> {
        (**self).buy_from_player_decision(player, state, property, price)
    }

    fn sell_to_player_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        price: i64,
    ) -> DecisionResult<bool> {
        (**self).sell_to_player_decision(player, state, property, price)
    }

    fn bidding_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        current_price: i64,
        current_leader: Option<usize>,
    ) -> DecisionResult<i64> {
        (**self).bidding_decision(player, state, property, current_price, current_leader)
    }

    fn finish(&mut self, outcome: &GameOutcome, state: &GameSnapshot) {
        (**self).finish(outcome, state)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("decision source disconnected")]
    Disconnected,
    #[error("no seat for player {0}")]
    UnknownSeat(usize),
    #[error(transparent)]
    Transport(#[from] crate::remote::TransportError),
}
