//! Standard actions: the eligibility lists, the per-turn action loop and the
//! handlers for each action.

use itertools::Itertools;

use crate::board::PropertyIndex;
use crate::game::action::{ActionDetails, AvailableActions};
use crate::game::game::Game;
use crate::game::state::GameError;
use crate::logging::GameLogger;
use crate::players::DecisionPort;
use crate::types::StdAction;

impl<D: DecisionPort, L: GameLogger> Game<D, L> {
    /// A color set carries houses somewhere, which freezes mortgaging and
    /// trading of all its members.
    fn set_has_houses(&self, property: PropertyIndex) -> bool {
        let details = &self.properties[property];
        details.can_build_house
            && self
                .board
                .set_members(details.set)
                .iter()
                .any(|&idx| self.properties[idx].houses > 0)
    }

    fn can_build_on(&self, player: usize, property: PropertyIndex) -> bool {
        let details = &self.properties[property];
        if !details.can_build_house || details.houses >= self.settings.max_houses {
            return false;
        }
        self.board.set_members(details.set).iter().all(|&idx| {
            let member = &self.properties[idx];
            member.is_owned_by(player) && !member.is_mortgaged && member.can_build_house
        })
    }

    /// Compute the menu for `player` from current ownership and the per-turn
    /// offer counters.
    pub(crate) fn available_actions(&self, player: usize) -> AvailableActions {
        let owned = &self.players[player].properties;
        let mortgage = owned
            .iter()
            .copied()
            .filter(|&p| !self.properties[p].is_mortgaged && !self.set_has_houses(p))
            .collect_vec();
        let buyout = owned
            .iter()
            .copied()
            .filter(|&p| self.properties[p].is_mortgaged)
            .collect_vec();
        let sell_property = owned
            .iter()
            .copied()
            .filter(|&p| !self.set_has_houses(p))
            .collect_vec();
        let buy_property = self
            .properties
            .iter()
            .filter(|p| p.owner.is_some_and(|owner| owner != player))
            .map(|p| p.property_index)
            .filter(|&p| !self.set_has_houses(p))
            .collect_vec();
        let buy_house = owned
            .iter()
            .copied()
            .filter(|&p| self.can_build_on(player, p))
            .collect_vec();
        let sell_house = owned
            .iter()
            .copied()
            .filter(|&p| self.properties[p].houses > 0)
            .collect_vec();

        let mut actions = vec![StdAction::NoAction];
        if !mortgage.is_empty() {
            actions.push(StdAction::Mortgage);
        }
        if !buyout.is_empty() {
            actions.push(StdAction::Buyout);
        }
        if !sell_property.is_empty() && self.sell_offer_tries < self.settings.max_offer_tries {
            actions.push(StdAction::SellOffer);
        }
        if !buy_property.is_empty() && self.buy_offer_tries < self.settings.max_offer_tries {
            actions.push(StdAction::BuyOffer);
        }
        if !buy_house.is_empty() {
            actions.push(StdAction::BuyHouse);
        }
        if !sell_house.is_empty() {
            actions.push(StdAction::SellHouse);
        }

        AvailableActions {
            actions,
            mortgage,
            buyout,
            sell_property,
            buy_property,
            buy_house,
            sell_house,
        }
    }

    /// Ask the current player for standard actions until they pass, the turn
    /// budget runs out or they stop being active.
    pub(crate) fn standard_actions(&mut self) -> Result<(), GameError> {
        let player = self.current_player;
        while self.std_actions_used < self.settings.max_std_actions_per_turn {
            if !self.continue_round(player)? {
                return Ok(());
            }
            let available = self.available_actions(player);
            let state = self.snapshot();
            let details = match self.port.std_action(player, &state, &available) {
                Ok(details) => details,
                Err(err) => return self.forfeit(player, &format!("action decision failed: {err}")),
            };
            if details.action == StdAction::NoAction {
                return Ok(());
            }
            self.std_actions_used += 1;
            self.resolve_standard_action(player, &details, &available)?;
        }
        Ok(())
    }

    /// Validate `details` against the menu that was offered and apply it.
    /// Anything outside the menu forfeits the player.
    pub(crate) fn resolve_standard_action(
        &mut self,
        player: usize,
        details: &ActionDetails,
        available: &AvailableActions,
    ) -> Result<(), GameError> {
        let action = details.action;
        if !available.offers(action) {
            return self.forfeit(player, &format!("{action} was not offered"));
        }
        if action == StdAction::NoAction {
            return Ok(());
        }
        let Some(property) = details
            .property_id
            .filter(|p| available.candidates(action).contains(p))
        else {
            return self.forfeit(
                player,
                &format!("{action} on ineligible property {:?}", details.property_id),
            );
        };

        match action {
            StdAction::NoAction => Ok(()),
            StdAction::Mortgage => self.mortgage(player, property),
            StdAction::Buyout => self.buyout(player, property),
            StdAction::BuyHouse => self.buy_house(player, property),
            StdAction::SellHouse => self.sell_house(player, property),
            StdAction::SellOffer => self.send_sell_offer(player, property, details),
            StdAction::BuyOffer => self.send_buy_offer(player, property, details),
        }
    }

    fn mortgage(&mut self, player: usize, property: PropertyIndex) -> Result<(), GameError> {
        let value = self.properties[property].mortgage_value();
        self.players[player].add_money(value)?;
        self.properties[property].is_mortgaged = true;
        self.logger.log(&format!(
            "{} mortgaged {} for {value}$",
            self.players[player].name, self.properties[property].name
        ));
        Ok(())
    }

    fn buyout(&mut self, player: usize, property: PropertyIndex) -> Result<(), GameError> {
        let cost = self.properties[property].buyout_cost();
        self.charge_player(player, cost, None)?;
        if !self.properties[property].is_owned_by(player) {
            return Ok(());
        }
        self.properties[property].is_mortgaged = false;
        self.logger.log(&format!(
            "{} lifted the mortgage on {}",
            self.players[player].name, self.properties[property].name
        ));
        Ok(())
    }

    fn buy_house(&mut self, player: usize, property: PropertyIndex) -> Result<(), GameError> {
        let price = self.properties[property].house_price;
        self.charge_player(player, price, None)?;
        if self.players[player].is_bankrupt {
            return Ok(());
        }
        if !self.can_build_on(player, property) {
            // Liquidating to afford the house broke the set; give the money back.
            self.players[player].add_money(price)?;
            let state = self.snapshot();
            self.logger.error(
                &format!(
                    "{} can no longer build on {}",
                    self.players[player].name, self.properties[property].name
                ),
                &state,
            );
            return Ok(());
        }
        self.properties[property].houses += 1;
        self.logger.log(&format!(
            "{} built a house on {} ({} total)",
            self.players[player].name,
            self.properties[property].name,
            self.properties[property].houses
        ));
        Ok(())
    }

    fn sell_house(&mut self, player: usize, property: PropertyIndex) -> Result<(), GameError> {
        let refund = self.properties[property].house_refund();
        self.players[player].add_money(refund)?;
        self.properties[property].houses -= 1;
        self.logger.log(&format!(
            "{} sold a house on {} for {refund}$",
            self.players[player].name, self.properties[property].name
        ));
        Ok(())
    }

    /// Offer `property` to each target in turn; the first who accepts and can
    /// pay buys it.
    fn send_sell_offer(
        &mut self,
        player: usize,
        property: PropertyIndex,
        details: &ActionDetails,
    ) -> Result<(), GameError> {
        let Some(price) = details.price.filter(|p| *p >= 0) else {
            return self.forfeit(player, &format!("invalid sell price {:?}", details.price));
        };
        let targets = &details.target_player_ids;
        let valid_targets = !targets.is_empty()
            && targets.iter().all_unique()
            && targets.iter().all(|&t| {
                t != player && self.players.get(t).is_some_and(|p| p.is_active())
            });
        if !valid_targets {
            return self.forfeit(player, &format!("invalid sell targets {targets:?}"));
        }
        self.sell_offer_tries += 1;

        for &target in targets {
            if !self.properties[property].is_owned_by(player) {
                return Ok(());
            }
            if !self.players[target].is_active() || self.players[target].money < price {
                continue;
            }
            let state = self.snapshot();
            match self
                .port
                .buy_from_player_decision(target, &state, property, price)
            {
                Ok(true) => {
                    self.charge(target, price, Some(player))?;
                    return self.transfer_property(player, target, property);
                }
                Ok(false) => {
                    self.logger.log(&format!(
                        "{} declined {} for {price}$",
                        self.players[target].name, self.properties[property].name
                    ));
                }
                Err(err) => {
                    self.forfeit(target, &format!("offer decision failed: {err}"))?;
                    if self.finished {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    /// Ask the owner of `property` to sell it to `player` at the quoted price.
    fn send_buy_offer(
        &mut self,
        player: usize,
        property: PropertyIndex,
        details: &ActionDetails,
    ) -> Result<(), GameError> {
        let Some(price) = details
            .price
            .filter(|p| *p >= 0 && *p <= self.players[player].money)
        else {
            return self.forfeit(player, &format!("invalid buy price {:?}", details.price));
        };
        let Some(owner) = self.properties[property].owner else {
            return self.forfeit(player, "buy offer for an unowned property");
        };
        self.buy_offer_tries += 1;

        let state = self.snapshot();
        match self.port.sell_to_player_decision(owner, &state, property, price) {
            Ok(true) => {
                self.charge(player, price, Some(owner))?;
                self.transfer_property(owner, player, property)
            }
            Ok(false) => {
                self.logger.log(&format!(
                    "{} refused to sell {} for {price}$",
                    self.players[owner].name, self.properties[property].name
                ));
                Ok(())
            }
            Err(err) => self.forfeit(owner, &format!("offer decision failed: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::game::ActionDetails;
    use crate::game::game::tests::scripted_game;
    use crate::types::StdAction;

    fn brown_monopoly() -> crate::game::game::Game<crate::players::ScriptedPlayer, crate::logging::MemoryLogger> {
        let mut game = scripted_game(&["a", "b", "c"]);
        game.add_property(0, 0).unwrap();
        game.add_property(0, 1).unwrap();
        game
    }

    #[test]
    fn fresh_game_offers_only_noaction() {
        let game = scripted_game(&["a", "b"]);
        let available = game.available_actions(0);
        assert_eq!(available.actions, vec![StdAction::NoAction]);
    }

    #[test]
    fn houses_require_the_full_unmortgaged_set() {
        let mut game = scripted_game(&["a", "b"]);
        game.add_property(0, 0).unwrap();
        assert!(game.available_actions(0).buy_house.is_empty());
        game.add_property(0, 1).unwrap();
        assert_eq!(game.available_actions(0).buy_house, vec![0, 1]);
        game.properties[1].is_mortgaged = true;
        assert!(game.available_actions(0).buy_house.is_empty());
        // Railroads never take houses.
        game.add_property(0, 2).unwrap();
        game.add_property(0, 10).unwrap();
        game.add_property(0, 17).unwrap();
        game.add_property(0, 25).unwrap();
        assert!(game.available_actions(0).buy_house.is_empty());
    }

    #[test]
    fn mortgage_and_house_lists_are_exclusive() {
        let mut game = brown_monopoly();
        game.properties[0].houses = 1;
        let available = game.available_actions(0);
        assert!(available.mortgage.is_empty());
        assert!(available.sell_property.is_empty());
        assert_eq!(available.sell_house, vec![0]);
        assert!(!available.offers(StdAction::Mortgage));
        assert!(game.available_actions(1).buy_property.is_empty());
    }

    #[test]
    fn buy_and_sell_house() {
        let mut game = brown_monopoly();
        game.port
            .push_std_action(ActionDetails::new(StdAction::BuyHouse).with_property(0));
        game.port
            .push_std_action(ActionDetails::new(StdAction::SellHouse).with_property(0));
        game.standard_actions().unwrap();
        assert_eq!(game.properties[0].houses, 0);
        assert_eq!(game.players[0].money, 1475);
        assert_eq!(game.std_actions_used, 2);
    }

    #[test]
    fn house_cap_limits_building() {
        let mut game = brown_monopoly();
        game.properties[0].houses = game.settings.max_houses;
        assert_eq!(game.available_actions(0).buy_house, vec![1]);
    }

    #[test]
    fn buyout_costs_ten_percent_over_list() {
        let mut game = scripted_game(&["a", "b"]);
        let property = game
            .properties
            .iter()
            .position(|p| p.price == 100)
            .unwrap();
        game.add_property(0, property).unwrap();
        game.properties[property].is_mortgaged = true;
        game.port
            .push_std_action(ActionDetails::new(StdAction::Buyout).with_property(property));
        game.standard_actions().unwrap();
        assert!(!game.properties[property].is_mortgaged);
        assert_eq!(game.players[0].money, 1390);
    }

    #[test]
    fn sell_offer_goes_to_first_taker() {
        let mut game = brown_monopoly();
        game.players[1].money = 50;
        game.port.push_std_action(
            ActionDetails::new(StdAction::SellOffer)
                .with_property(1)
                .with_price(100)
                .with_targets([1, 2]),
        );
        // Seat 1 cannot afford it and is skipped; seat 2 accepts.
        game.port.push_offer_reply(true);
        game.standard_actions().unwrap();
        assert_eq!(game.properties[1].owner, Some(2));
        assert_eq!(game.players[0].money, 1600);
        assert_eq!(game.players[2].money, 1400);
        assert_eq!(game.sell_offer_tries, 1);
        assert!(!game.available_actions(0).offers(StdAction::SellOffer));
    }

    #[test]
    fn sell_offer_to_self_forfeits() {
        let mut game = brown_monopoly();
        game.port.push_std_action(
            ActionDetails::new(StdAction::SellOffer)
                .with_property(1)
                .with_price(100)
                .with_targets([0]),
        );
        game.standard_actions().unwrap();
        assert!(game.players[0].is_bankrupt);
    }

    #[test]
    fn buy_offer_accepted_by_owner() {
        let mut game = brown_monopoly();
        game.current_player = 1;
        game.port.push_std_action(
            ActionDetails::new(StdAction::BuyOffer)
                .with_property(0)
                .with_price(75),
        );
        game.port.push_offer_reply(true);
        game.standard_actions().unwrap();
        assert_eq!(game.properties[0].owner, Some(1));
        assert_eq!(game.players[1].money, 1425);
        assert_eq!(game.players[0].money, 1575);
    }

    #[test]
    fn buy_offer_above_cash_forfeits() {
        let mut game = brown_monopoly();
        game.current_player = 2;
        game.port.push_std_action(
            ActionDetails::new(StdAction::BuyOffer)
                .with_property(0)
                .with_price(5_000),
        );
        game.standard_actions().unwrap();
        assert!(game.players[2].is_bankrupt);
        assert_eq!(game.properties[0].owner, Some(0));
    }

    #[test]
    fn missing_property_argument_forfeits() {
        let mut game = brown_monopoly();
        game.port
            .push_std_action(ActionDetails::new(StdAction::Mortgage));
        game.standard_actions().unwrap();
        assert!(game.players[0].is_bankrupt);
        assert_eq!(game.logger.errors().count(), 1);
    }
}
