//! Cash and ownership ledger operations: charging with forced liquidation,
//! bankruptcy and title transfer.

use crate::board::PropertyIndex;
use crate::game::game::Game;
use crate::game::players::LedgerError;
use crate::game::state::GameError;
use crate::logging::GameLogger;
use crate::players::DecisionPort;

impl<D: DecisionPort, L: GameLogger> Game<D, L> {
    /// Collect `amount` from `payer`, forcing liquidation when cash runs short.
    /// Goes bankrupt straight away when even full liquidation cannot cover it.
    pub(crate) fn charge_player(
        &mut self,
        payer: usize,
        amount: i64,
        creditor: Option<usize>,
    ) -> Result<(), GameError> {
        if self.players[payer].money >= amount {
            return self.charge(payer, amount, creditor);
        }
        if self.net_worth(payer) < amount {
            self.logger.log(&format!(
                "{} cannot cover {amount}$ even after liquidation",
                self.players[payer].name
            ));
            return self.bankrupt(payer, creditor);
        }

        while self.players[payer].money < amount {
            let available = self.available_actions(payer).liquidation_only();
            if available.actions.is_empty() {
                return self.bankrupt(payer, creditor);
            }
            let mut state = self.snapshot();
            state.charge = Some(amount);
            let details = match self.port.std_action(payer, &state, &available) {
                Ok(details) => details,
                Err(err) => {
                    return self.forfeit(payer, &format!("liquidation decision failed: {err}"));
                }
            };
            self.resolve_standard_action(payer, &details, &available)?;
            if self.players[payer].is_bankrupt {
                return Ok(());
            }
        }
        self.charge(payer, amount, creditor)
    }

    /// Move `amount` from `payer` to `creditor` (or the bank) without any
    /// liquidation. A payer who cannot afford it goes bankrupt.
    pub(crate) fn charge(
        &mut self,
        payer: usize,
        amount: i64,
        creditor: Option<usize>,
    ) -> Result<(), GameError> {
        // A creditor knocked out mid-transaction is paid through the bank.
        let creditor = creditor.filter(|&c| self.players[c].is_active());
        if self.players[payer].money < amount {
            return self.bankrupt(payer, creditor);
        }
        self.players[payer].remove_money(amount)?;
        if let Some(creditor) = creditor {
            self.players[creditor].add_money(amount)?;
            self.logger.log(&format!(
                "{} paid {amount}$ to {}",
                self.players[payer].name, self.players[creditor].name
            ));
        } else {
            self.logger
                .log(&format!("{} paid {amount}$ to the bank", self.players[payer].name));
        }
        Ok(())
    }

    /// Idempotent. With a creditor, remaining cash and every title go to the
    /// creditor; otherwise each title is reset and auctioned.
    pub(crate) fn bankrupt(
        &mut self,
        player: usize,
        creditor: Option<usize>,
    ) -> Result<(), GameError> {
        if self.players[player].is_bankrupt {
            return Ok(());
        }
        self.players[player].is_bankrupt = true;
        self.logger
            .log(&format!("{} is bankrupt", self.players[player].name));
        if self.active_players().len() <= 1 {
            self.finished = true;
        }

        let holdings: Vec<PropertyIndex> =
            self.players[player].properties.iter().copied().collect();
        match creditor.filter(|&c| c != player && self.players[c].is_active()) {
            Some(creditor) => {
                let cash = self.players[player].money.max(0);
                self.players[creditor].add_money(cash)?;
                for property in holdings {
                    self.transfer_property(player, creditor, property)?;
                }
            }
            None => {
                for &property in &holdings {
                    self.players[player].remove_property(property)?;
                    self.properties[property].reset();
                }
                for property in holdings {
                    if self.finished {
                        break;
                    }
                    let active = self.active_players();
                    let first = active[self.rng.index(active.len())];
                    self.auction(property, first)?;
                }
            }
        }

        let round = self.round;
        self.players[player].mark_bankrupt(round);
        Ok(())
    }

    /// Bankrupt `player` for a rule violation, with no creditor.
    pub(crate) fn forfeit(&mut self, player: usize, reason: &str) -> Result<(), GameError> {
        let state = self.snapshot();
        self.logger.error(
            &format!("{} forfeits: {reason}", self.players[player].name),
            &state,
        );
        self.bankrupt(player, None)
    }

    pub(crate) fn add_property(
        &mut self,
        player: usize,
        property: PropertyIndex,
    ) -> Result<(), GameError> {
        if self.properties[property].owner.is_some() {
            return Err(LedgerError::PropertyTaken { property }.into());
        }
        self.players[player].add_property(property)?;
        self.properties[property].owner = Some(player);
        self.logger.log(&format!(
            "{} acquired {}",
            self.players[player].name, self.properties[property].name
        ));
        Ok(())
    }

    /// Hand a title over, keeping houses and mortgage state as they are.
    pub(crate) fn transfer_property(
        &mut self,
        from: usize,
        to: usize,
        property: PropertyIndex,
    ) -> Result<(), GameError> {
        if !self.properties[property].is_owned_by(from) {
            return Err(LedgerError::NotOwned {
                property,
                player: self.players[from].name.clone(),
            }
            .into());
        }
        self.players[from].remove_property(property)?;
        self.players[to].add_property(property)?;
        self.properties[property].owner = Some(to);
        self.logger.log(&format!(
            "{} passed from {} to {}",
            self.properties[property].name, self.players[from].name, self.players[to].name
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::game::ActionDetails;
    use crate::game::game::tests::scripted_game;
    use crate::types::StdAction;

    #[test]
    fn charge_moves_cash_to_creditor() {
        let mut game = scripted_game(&["a", "b"]);
        game.charge_player(0, 120, Some(1)).unwrap();
        assert_eq!(game.players[0].money, 1380);
        assert_eq!(game.players[1].money, 1620);

        game.charge_player(1, 20, None).unwrap();
        assert_eq!(game.players[1].money, 1600);
    }

    #[test]
    fn short_payer_liquidates_until_covered() {
        let mut game = scripted_game(&["a", "b"]);
        game.add_property(0, 27).unwrap();
        game.add_property(0, 26).unwrap();
        game.players[0].money = 100;
        game.port
            .push_std_action(ActionDetails::new(StdAction::Mortgage).with_property(27));
        game.charge_player(0, 250, Some(1)).unwrap();
        assert_eq!(game.port.liquidation_charges, vec![250]);
        // 100 + 200 from the Boardwalk mortgage, then 250 paid.
        assert_eq!(game.players[0].money, 50);
        assert_eq!(game.players[1].money, 1750);
        assert!(game.properties[27].is_mortgaged);
        assert!(!game.properties[26].is_mortgaged);
    }

    #[test]
    fn unoffered_liquidation_choice_forfeits_without_creditor() {
        let answers = [
            ActionDetails::no_action(),
            ActionDetails::new(StdAction::Mortgage).with_property(5),
            ActionDetails::new(StdAction::BuyHouse).with_property(27),
        ];
        for answer in answers {
            let mut game = scripted_game(&["a", "b"]);
            game.add_property(0, 27).unwrap();
            game.players[0].money = 100;
            game.port.push_std_action(answer);
            game.charge_player(0, 250, Some(1)).unwrap();

            assert_eq!(game.port.liquidation_charges, vec![250]);
            assert!(game.players[0].is_bankrupt);
            assert_eq!(game.players[0].money, -1);
            assert_eq!(game.players[1].money, 1500);
            assert_eq!(game.properties[27].owner, None);
            assert_eq!(game.logger.errors().count(), 1);
        }
    }

    #[test]
    fn hopeless_charge_bankrupts_to_creditor() {
        let mut game = scripted_game(&["a", "b", "c"]);
        game.add_property(0, 0).unwrap();
        game.players[0].money = 10;
        game.charge_player(0, 500, Some(2)).unwrap();
        assert!(game.players[0].is_bankrupt);
        assert_eq!(game.players[0].money, -1);
        assert_eq!(game.players[0].position, -1);
        assert_eq!(game.players[0].round_when_bankrupted, Some(1));
        assert_eq!(game.players[2].money, 1510);
        assert_eq!(game.properties[0].owner, Some(2));
        assert!(game.players[2].properties.contains(&0));
        assert!(!game.finished);
    }

    #[test]
    fn bankruptcy_is_idempotent() {
        let mut game = scripted_game(&["a", "b", "c"]);
        game.add_property(0, 5).unwrap();
        game.bankrupt(0, Some(1)).unwrap();
        let after_first = game.snapshot();
        game.bankrupt(0, Some(2)).unwrap();
        game.bankrupt(0, None).unwrap();
        assert_eq!(game.snapshot(), after_first);
    }

    #[test]
    fn bankruptcy_without_creditor_returns_titles_to_auction() {
        let mut game = scripted_game(&["a", "b", "c"]);
        game.add_property(0, 9).unwrap();
        game.properties[9].is_mortgaged = true;
        game.bankrupt(0, None).unwrap();
        // Nobody bids, so the title stays with the bank in a clean state.
        let property = &game.properties[9];
        assert_eq!(property.owner, None);
        assert!(!property.is_mortgaged);
        assert_eq!(property.houses, 0);
        assert!(game.players[0].properties.is_empty());
    }

    #[test]
    fn last_player_standing_finishes_the_game() {
        let mut game = scripted_game(&["a", "b"]);
        game.bankrupt(1, None).unwrap();
        assert!(game.finished);
        assert_eq!(game.active_players(), vec![0]);
    }

    #[test]
    fn transfer_requires_ownership() {
        let mut game = scripted_game(&["a", "b"]);
        assert!(game.transfer_property(0, 1, 3).is_err());
        game.add_property(0, 3).unwrap();
        assert!(game.add_property(1, 3).is_err());
        game.transfer_property(0, 1, 3).unwrap();
        assert_eq!(game.properties[3].owner, Some(1));
        assert!(game.players[1].properties.contains(&3));
        assert!(!game.players[0].properties.contains(&3));
    }
}
