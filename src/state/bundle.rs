use serde::Serialize;

use super::contract::Contract;
use super::event::MarketEvent;
use crate::types::Platform;

/// One event plus its contracts, tagged by platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bundle {
    pub platform: Platform,
    pub event: MarketEvent,
    pub contracts: Vec<Contract>,
}

impl Bundle {
    pub fn new(platform: Platform, event: MarketEvent, contracts: Vec<Contract>) -> Self {
        Self {
            platform,
            event,
            contracts,
        }
    }

    /// The event a contract of this bundle belongs to.
    pub fn event_of(&self, contract: &Contract) -> Option<&MarketEvent> {
        (contract.event_ticker == self.event.ticker).then_some(&self.event)
    }

    pub fn contract(&self, ticker: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.ticker == ticker)
    }

    /// Number of contracts that have an order book attached.
    pub fn books_attached(&self) -> usize {
        self.contracts
            .iter()
            .filter(|c| c.order_book().is_some())
            .count()
    }
}
