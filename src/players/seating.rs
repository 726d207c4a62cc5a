use crate::board::PropertyIndex;
use crate::game::{ActionDetails, AvailableActions, GameOutcome, GameSnapshot};
use crate::players::base::{DecisionError, DecisionPort, DecisionResult};
use crate::types::JailAction;

pub type Seat = Box<dyn DecisionPort + Send>;

/// Routes every decision to the port sitting in that player's seat. Seats
/// keep the order they were added in, which is also the turn order.
#[derive(Default)]
pub struct Seating {
    names: Vec<String>,
    seats: Vec<Seat>,
}

impl Seating {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seat(mut self, name: impl Into<String>, seat: Seat) -> Self {
        self.push(name, seat);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, seat: Seat) {
        self.names.push(name.into());
        self.seats.push(seat);
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    fn seat(&mut self, player: usize) -> DecisionResult<&mut Seat> {
        self.seats
            .get_mut(player)
            .ok_or(DecisionError::UnknownSeat(player))
    }
}

impl DecisionPort for Seating {
    fn init(&mut self) -> Vec<String> {
        for seat in &mut self.seats {
            seat.init();
        }
        self.names.clone()
    }

    fn std_action(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        available: &AvailableActions,
    ) -> DecisionResult<ActionDetails> {
        self.seat(player)?.std_action(player, state, available)
    }

    fn jail_action(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        available: &[JailAction],
    ) -> DecisionResult<JailAction> {
        self.seat(player)?.jail_action(player, state, available)
    }

    fn buy_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
    ) -> DecisionResult<bool> {
        self.seat(player)?.buy_decision(player, state, property)
    }

    fn buy_from_player_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        price: i64,
    ) -> DecisionResult<bool> {
        self.seat(player)?
            .buy_from_player_decision(player, state, property, price)
    }

    fn sell_to_player_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        price: i64,
    ) -> DecisionResult<bool> {
        self.seat(player)?
            .sell_to_player_decision(player, state, property, price)
    }

    fn bidding_decision(
        &mut self,
        player: usize,
        state: &GameSnapshot,
        property: PropertyIndex,
        current_price: i64,
        current_leader: Option<usize>,
    ) -> DecisionResult<i64> {
        self.seat(player)?
            .bidding_decision(player, state, property, current_price, current_leader)
    }

    fn finish(&mut self, outcome: &GameOutcome, state: &GameSnapshot) {
        for seat in &mut self.seats {
            seat.finish(outcome, state);
        }
    }
}
