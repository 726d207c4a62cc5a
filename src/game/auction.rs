use std::collections::VecDeque;

use crate::board::PropertyIndex;
use crate::game::game::Game;
use crate::game::state::GameError;
use crate::logging::GameLogger;
use crate::players::DecisionPort;

impl<D: DecisionPort, L: GameLogger> Game<D, L> {
    /// Open ascending auction for an unowned property. Bidders rotate starting
    /// at `first_bidder`; a bid not above the current price is a pass and
    /// removes the bidder, a raise puts them back at the end of the queue.
    pub(crate) fn auction(
        &mut self,
        property: PropertyIndex,
        first_bidder: usize,
    ) -> Result<(), GameError> {
        let count = self.players.len();
        let mut queue: VecDeque<usize> = (0..count)
            .map(|offset| (first_bidder + offset) % count)
            .filter(|&idx| self.players[idx].is_active())
            .collect();
        let mut price = self.settings.min_auction_price;
        let mut leader: Option<usize> = None;
        self.logger.log(&format!(
            "Auction for {} opens at {price}$",
            self.properties[property].name
        ));

        while let Some(bidder) = queue.pop_front() {
            if leader == Some(bidder) {
                break;
            }
            if self.players[bidder].is_bankrupt {
                continue;
            }
            let state = self.snapshot();
            let bid = match self
                .port
                .bidding_decision(bidder, &state, property, price, leader)
            {
                Ok(bid) => bid,
                Err(err) => {
                    self.forfeit(bidder, &format!("bidding decision failed: {err}"))?;
                    if self.finished {
                        return Ok(());
                    }
                    continue;
                }
            };

            if bid <= price {
                self.logger
                    .log(&format!("{} passes", self.players[bidder].name));
            } else if bid > self.players[bidder].money {
                self.forfeit(bidder, &format!("bid {bid}$ exceeds available cash"))?;
            } else {
                price = bid;
                leader = Some(bidder);
                queue.push_back(bidder);
                self.logger
                    .log(&format!("{} bids {bid}$", self.players[bidder].name));
            }
            if self.finished {
                return Ok(());
            }
        }

        let Some(winner) = leader else {
            self.logger.log(&format!(
                "No bids for {}, it stays with the bank",
                self.properties[property].name
            ));
            return Ok(());
        };
        if self.players[winner].is_bankrupt || self.properties[property].owner.is_some() {
            return Ok(());
        }
        self.charge(winner, price, None)?;
        if self.players[winner].is_bankrupt {
            return Ok(());
        }
        self.add_property(winner, property)
    }
}
