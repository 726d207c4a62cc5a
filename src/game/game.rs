use uuid::Uuid;

use crate::board::{Board, Property};
use crate::game::config::{GameConfig, GameSettings};
use crate::game::players::PlayerState;
use crate::game::rng::{Dice, GameRng};
use crate::game::state::{CancelToken, GameError, GameOutcome, GameSnapshot};
use crate::logging::{GameLogger, TracingLogger};
use crate::players::DecisionPort;
use crate::types::{FinishReason, JailAction};

const MIN_PLAYERS: usize = 2;
const MAX_PLAYERS: usize = 4;
/// The third consecutive double sends the player to jail instead of moving.
const MAX_MOVES_PER_TURN: u32 = 3;
/// A jailed player may try rolling out this many times before bail or a card
/// becomes mandatory.
const MAX_JAIL_ROLLS: u32 = 3;

pub struct Game<D, L = TracingLogger> {
    pub id: Uuid,
    pub seed: u64,
    pub(crate) board: Board,
    pub(crate) players: Vec<PlayerState>,
    pub(crate) properties: Vec<Property>,
    pub(crate) settings: GameSettings,
    pub(crate) round: u32,
    pub(crate) current_player: usize,
    pub(crate) std_actions_used: u32,
    pub(crate) buy_offer_tries: u32,
    pub(crate) sell_offer_tries: u32,
    pub(crate) last_roll: Option<Dice>,
    pub(crate) finished: bool,
    pub(crate) outcome: Option<GameOutcome>,
    pub(crate) rng: GameRng,
    pub(crate) port: D,
    pub(crate) logger: L,
    cancel: CancelToken,
}

impl<D: DecisionPort, L: GameLogger> Game<D, L> {
    /// Build a match. Seat names come from the decision port's `init`.
    pub fn new(config: GameConfig, mut port: D, mut logger: L) -> Result<Self, GameError> {
        config.settings.validate()?;
        let id = Uuid::new_v4();
        logger.bind_game(id);
        logger.log(&format!("Initializing game {id} with seed {}", config.seed));

        let names = port.init();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&names.len()) {
            return Err(GameError::PlayerCount(names.len()));
        }
        let players = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| PlayerState::new(idx, name, config.settings.starting_money))
            .collect::<Result<Vec<_>, _>>()?;
        let board = Board::standard()?;
        let properties = board.initial_properties();

        Ok(Self {
            id,
            seed: config.seed,
            board,
            players,
            properties,
            settings: config.settings,
            round: 1,
            current_player: 0,
            std_actions_used: 0,
            buy_offer_tries: 0,
            sell_offer_tries: 0,
            last_roll: None,
            finished: false,
            outcome: None,
            rng: GameRng::new(config.seed),
            port,
            logger,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn port(&self) -> &D {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut D {
        &mut self.port
    }

    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Script upcoming dice rolls, e.g. to replay a recorded match.
    pub fn load_dice(&mut self, dice: impl IntoIterator<Item = Dice>) {
        self.rng.load_dice(dice);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.clone(),
            properties: self.properties.clone(),
            round: self.round,
            current_player: self.current_player,
            charge: None,
            sell_offer_tries: self.sell_offer_tries,
            buy_offer_tries: self.buy_offer_tries,
            std_actions_used: self.std_actions_used,
        }
    }

    pub fn active_players(&self) -> Vec<usize> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .collect()
    }

    /// Play the match to completion and report the result through the
    /// decision port.
    pub fn start(&mut self) -> Result<GameOutcome, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::GameFinished);
        }
        while !self.finished {
            for idx in 0..self.players.len() {
                self.current_player = idx;
                if !self.continue_round(idx)? {
                    continue;
                }
                self.play_turn(idx)?;
            }
            if self.finished {
                break;
            }
            self.round += 1;
            if self.round > self.settings.max_rounds {
                self.finished = true;
            }
        }
        Ok(self.end_game())
    }

    /// Whether `player` should act now. Trips the cancellation abort.
    pub(crate) fn continue_round(&self, player: usize) -> Result<bool, GameError> {
        if self.cancel.is_cancelled() {
            return Err(GameError::Cancelled);
        }
        if self.finished {
            return Ok(false);
        }
        Ok(self.players[player].is_active())
    }

    fn play_turn(&mut self, player: usize) -> Result<(), GameError> {
        self.std_actions_used = 0;
        self.sell_offer_tries = 0;
        self.buy_offer_tries = 0;
        let state = self.snapshot();
        self.logger.log_state(&state);

        if self.players[player].is_jailed {
            return self.handle_jail();
        }
        self.take_moves(None)
    }

    /// Roll, move, resolve and negotiate, repeating while doubles keep coming.
    pub(crate) fn take_moves(&mut self, mut dice: Option<Dice>) -> Result<(), GameError> {
        let player = self.current_player;
        for moves_in_a_row in 1..=MAX_MOVES_PER_TURN {
            let (d1, d2) = match dice.take() {
                Some(dice) => {
                    self.last_roll = Some(dice);
                    dice
                }
                None => self.roll_dice(),
            };
            let doubles = d1 == d2;
            if moves_in_a_row >= MAX_MOVES_PER_TURN && doubles {
                self.logger
                    .log(&format!("{} rolled a third double", self.players[player].name));
                self.jail_player(player);
                return Ok(());
            }

            self.move_player(player, usize::from(d1 + d2))?;
            let position = self.players[player].field();
            self.resolve_field(position)?;
            if !self.continue_round(player)? || self.players[player].is_jailed {
                return Ok(());
            }

            self.standard_actions()?;
            if !self.continue_round(player)? || !doubles {
                return Ok(());
            }
        }
        Ok(())
    }

    pub(crate) fn roll_dice(&mut self) -> Dice {
        let dice = self.rng.roll_dice();
        self.last_roll = Some(dice);
        dice
    }

    /// Advance around the loop, paying the pass money for every lap finished.
    pub(crate) fn move_player(&mut self, player: usize, steps: usize) -> Result<(), GameError> {
        let size = self.board.len();
        let pass_money = self.settings.start_pass_money;
        let state = &mut self.players[player];
        let mut position = state.field() + steps;
        while position >= size {
            state.add_money(pass_money)?;
            position -= size;
        }
        state.set_position(position);
        let message = format!("{} moved to {}", state.name, self.board.field(position));
        self.logger.log(&message);
        Ok(())
    }

    pub(crate) fn jail_player(&mut self, player: usize) {
        self.players[player].jail(self.settings.jail_position);
        let message = format!("{} goes to jail", self.players[player].name);
        self.logger.log(&message);
    }

    fn handle_jail(&mut self) -> Result<(), GameError> {
        let player = self.current_player;
        self.standard_actions()?;
        if !self.continue_round(player)? {
            return Ok(());
        }

        let mut available = vec![JailAction::Bail];
        if self.players[player].jail_cards > 0 {
            available.push(JailAction::Card);
        }
        if self.players[player].rounds_in_jail < MAX_JAIL_ROLLS {
            available.push(JailAction::RollDice);
        }
        let state = self.snapshot();
        let choice = match self.port.jail_action(player, &state, &available) {
            Ok(choice) => choice,
            Err(err) => return self.forfeit(player, &format!("jail decision failed: {err}")),
        };
        if !available.contains(&choice) {
            return self.forfeit(player, &format!("jail action {choice} was not offered"));
        }

        match choice {
            JailAction::RollDice => {
                let (d1, d2) = self.roll_dice();
                if d1 == d2 {
                    self.players[player].release();
                    self.take_moves(Some((d1, d2)))
                } else {
                    self.players[player].rounds_in_jail += 1;
                    Ok(())
                }
            }
            JailAction::Bail => {
                self.charge_player(player, self.settings.jail_bail, None)?;
                if !self.continue_round(player)? {
                    return Ok(());
                }
                self.players[player].release();
                self.take_moves(None)
            }
            JailAction::Card => {
                let state = &mut self.players[player];
                state.jail_cards -= 1;
                state.release();
                self.take_moves(None)
            }
        }
    }

    /// Cash plus the liquidation value of every held property.
    pub fn net_worth(&self, player: usize) -> i64 {
        let state = &self.players[player];
        state.money
            + state
                .properties
                .iter()
                .map(|&idx| self.properties[idx].liquidation_value())
                .sum::<i64>()
    }

    fn end_game(&mut self) -> GameOutcome {
        let active = self.active_players();
        let rounds = self.round.min(self.settings.max_rounds);
        let outcome = match active.as_slice() {
            [] => GameOutcome {
                reason: FinishReason::Draw,
                winner: None,
                rounds,
            },
            [winner] => GameOutcome {
                reason: FinishReason::Win,
                winner: Some(*winner),
                rounds,
            },
            _ => {
                // Strictly greater replaces the leader, so ties go to the
                // earliest seat.
                let mut best: Option<(usize, i64)> = None;
                for &idx in &active {
                    let worth = self.net_worth(idx);
                    if best.is_none_or(|(_, top)| worth > top) {
                        best = Some((idx, worth));
                    }
                }
                GameOutcome {
                    reason: FinishReason::RoundLimit,
                    winner: best.map(|(idx, _)| idx),
                    rounds,
                }
            }
        };
        self.finished = true;
        self.outcome = Some(outcome);
        let state = self.snapshot();
        self.logger.log(&format!(
            "Game over after {} rounds: {} winner={:?}",
            outcome.rounds, outcome.reason, outcome.winner
        ));
        self.logger.log_state(&state);
        self.port.finish(&outcome, &state);
        outcome
    }
}
