use crate::board::{Field, FieldIndex, PropertyIndex};
use crate::game::game::Game;
use crate::game::state::GameError;
use crate::logging::GameLogger;
use crate::players::DecisionPort;
use crate::types::PropertySet;

const CHEST_CARDS: usize = 7;
const CHANCE_CARDS: usize = 8;
/// Warp cards can chain onto further card fields; stop following after this.
const MAX_FIELD_CHAIN: usize = 16;

/// Effect of a drawn card. Community chest draws from the first seven,
/// chance additionally contains the random warp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Card {
    Receive,
    Pay,
    CollectFromEach,
    PayEach,
    GoToJail,
    JailCard,
    AdvanceToGo,
    Warp,
}

impl Card {
    fn from_draw(draw: usize) -> Self {
        match draw {
            0 => Card::Receive,
            1 => Card::Pay,
            2 => Card::CollectFromEach,
            3 => Card::PayEach,
            4 => Card::GoToJail,
            5 => Card::JailCard,
            6 => Card::AdvanceToGo,
            _ => Card::Warp,
        }
    }
}

impl<D: DecisionPort, L: GameLogger> Game<D, L> {
    /// Apply the effect of the current player landing on `field`, following
    /// warps onto further fields.
    pub(crate) fn resolve_field(&mut self, field: FieldIndex) -> Result<(), GameError> {
        let mut next = Some(field);
        let mut depth = 0;
        while let Some(field) = next.take() {
            depth += 1;
            if depth > MAX_FIELD_CHAIN {
                let state = self.snapshot();
                self.logger.error("field resolution chain too long", &state);
                break;
            }
            next = self.resolve_single_field(field)?;
            if !self.players[self.current_player].is_active() {
                break;
            }
        }
        Ok(())
    }

    fn resolve_single_field(&mut self, field: FieldIndex) -> Result<Option<FieldIndex>, GameError> {
        let player = self.current_player;
        let landed = self.board.field(field).clone();
        match landed {
            Field::NoAction { .. } => Ok(None),
            Field::Property { property, .. } => {
                self.land_on_property(property)?;
                Ok(None)
            }
            Field::Tax { amount, .. } => {
                self.charge_player(player, amount, None)?;
                Ok(None)
            }
            Field::GoToJail { .. } => {
                self.jail_player(player);
                Ok(None)
            }
            Field::Chest { .. } => {
                let card = Card::from_draw(self.rng.index(CHEST_CARDS));
                self.resolve_card(card)
            }
            Field::Chance { .. } => {
                let card = Card::from_draw(self.rng.index(CHANCE_CARDS));
                self.resolve_card(card)
            }
        }
    }

    fn resolve_card(&mut self, card: Card) -> Result<Option<FieldIndex>, GameError> {
        let player = self.current_player;
        let name = self.players[player].name.clone();
        match card {
            Card::Receive => {
                let amount = self.rng.amount(50, 200);
                self.players[player].add_money(amount)?;
                self.logger.log(&format!("{name} received {amount}$"));
            }
            Card::Pay => {
                let amount = self.rng.amount(50, 150);
                self.logger.log(&format!("{name} must pay {amount}$"));
                self.charge_player(player, amount, None)?;
            }
            Card::CollectFromEach => {
                let amount = self.rng.amount(10, 20);
                self.logger
                    .log(&format!("{name} collects {amount}$ from every player"));
                for other in self.active_players() {
                    if other == player {
                        continue;
                    }
                    if self.finished || !self.players[player].is_active() {
                        break;
                    }
                    self.charge_player(other, amount, Some(player))?;
                }
            }
            Card::PayEach => {
                let amount = self.rng.amount(10, 20);
                self.logger
                    .log(&format!("{name} pays {amount}$ to every player"));
                for other in self.active_players() {
                    if other == player {
                        continue;
                    }
                    if !self.players[player].is_active() {
                        break;
                    }
                    self.charge_player(player, amount, Some(other))?;
                }
            }
            Card::GoToJail => self.jail_player(player),
            Card::JailCard => {
                self.players[player].jail_cards += 1;
                self.logger.log(&format!("{name} got a get-out-of-jail card"));
            }
            Card::AdvanceToGo => {
                self.players[player].set_position(0);
                self.players[player].add_money(self.settings.start_pass_money)?;
                self.logger.log(&format!("{name} advanced to GO"));
            }
            Card::Warp => {
                let target = self.rng.index(self.board.len());
                self.players[player].set_position(target);
                self.logger
                    .log(&format!("{name} warped to {}", self.board.field(target)));
                return Ok(Some(target));
            }
        }
        Ok(None)
    }

    fn land_on_property(&mut self, property: PropertyIndex) -> Result<(), GameError> {
        let player = self.current_player;
        match self.properties[property].owner {
            Some(owner) if owner == player => Ok(()),
            Some(owner) => {
                let rent = self.rent(property);
                self.charge_player(player, rent, Some(owner))
            }
            None => {
                let price = self.properties[property].price;
                if self.players[player].money < price {
                    return self.auction(property, player);
                }
                let state = self.snapshot();
                match self.port.buy_decision(player, &state, property) {
                    Ok(true) => {
                        self.charge(player, price, None)?;
                        self.add_property(player, property)
                    }
                    Ok(false) => self.auction(property, player),
                    Err(err) => self.forfeit(player, &format!("buy decision failed: {err}")),
                }
            }
        }
    }

    /// Rent owed for landing on `property` given current ownership, houses
    /// and the last dice total.
    pub(crate) fn rent(&self, property: PropertyIndex) -> i64 {
        let details = &self.properties[property];
        let Some(owner) = details.owner else {
            return 0;
        };
        if details.is_mortgaged {
            return 0;
        }
        let rents = self.board.rents(property);
        let members = self.board.set_members(details.set);
        let held = members
            .iter()
            .filter(|&&idx| self.properties[idx].is_owned_by(owner))
            .count();
        let tier = |count: usize| rents[count.clamp(1, rents.len()) - 1];
        match details.set {
            PropertySet::Railroad => tier(held),
            PropertySet::Utility => {
                let total = self
                    .last_roll
                    .map(|(a, b)| i64::from(a) + i64::from(b))
                    .unwrap_or(0);
                tier(held) * total
            }
            _ if held == members.len() => {
                rents[(1 + usize::from(details.houses)).min(rents.len() - 1)]
            }
            _ => rents[0],
        }
    }
}
