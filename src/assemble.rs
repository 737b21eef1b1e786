//! Bundle assembly: event + contracts + order books, one bundle per event.
//!
//! Failures are isolated to the smallest unit. A bad event drops its bundle,
//! a bad market drops that contract, a missing book leaves that contract
//! without one (Kalshi) or with an empty one (Polymarket).

use serde_json::Value;
use std::fmt::Display;
use tracing::{debug, warn};

use crate::normalize::{kalshi, polymarket, DecodeError, StrikeMapping};
use crate::state::{Bundle, Contract, MarketEvent, OrderBook};
use crate::types::Platform;

/// What to do with a contract whose book could not be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingBook {
    /// Leave `order_book` unset.
    Leave,
    /// Attach an empty book so the contract still renders.
    Empty,
}

impl MissingBook {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Kalshi => MissingBook::Leave,
            Platform::Polymarket => MissingBook::Empty,
        }
    }
}

/// Decode every market, keeping the ones that parse. Returns the contracts in
/// payload order plus the (index, error) of each skipped market.
pub fn collect_contracts<F>(
    markets: &[Value],
    event: &MarketEvent,
    decode: F,
) -> (Vec<Contract>, Vec<(usize, DecodeError)>)
where
    F: Fn(&Value, &MarketEvent) -> Result<Contract, DecodeError>,
{
    let mut contracts = Vec::with_capacity(markets.len());
    let mut skipped = Vec::new();

    for (i, market) in markets.iter().enumerate() {
        match decode(market, event) {
            Ok(c) => contracts.push(c),
            Err(e) => {
                let ticker = market
                    .get("ticker")
                    .or_else(|| market.get("conditionId"))
                    .and_then(Value::as_str)
                    .unwrap_or("<no-ticker>");
                warn!(
                    "[{}] Skipping market {} ({}) in event {}: {}",
                    event.platform, i, ticker, event.ticker, e
                );
                skipped.push((i, e));
            }
        }
    }

    (contracts, skipped)
}

/// Bundle from a Kalshi `GET /events/{ticker}?with_nested_markets=true` body.
pub fn kalshi_bundle(payload: &Value, mapping: StrikeMapping) -> Option<Bundle> {
    let event = match payload.get("event") {
        Some(raw) => kalshi::decode_event(raw),
        None => Err(DecodeError::MissingField("event")),
    };
    let event = match event {
        Ok(e) => e,
        Err(e) => {
            warn!("[Kalshi] Failed to parse event: {}", e);
            return None;
        }
    };

    let markets = kalshi::event_markets(payload);
    let (contracts, _) = collect_contracts(markets, &event, |m, e| {
        kalshi::decode_market(m, e, mapping)
    });

    debug!(
        "[Kalshi] Event {}: {}/{} markets parsed",
        event.ticker,
        contracts.len(),
        markets.len()
    );
    Some(Bundle::new(Platform::Kalshi, event, contracts))
}

/// Bundle from one Gamma event object.
pub fn polymarket_bundle(raw: &Value) -> Option<Bundle> {
    let event = match polymarket::decode_event(raw) {
        Ok(e) => e,
        Err(e) => {
            let ticker = raw
                .get("ticker")
                .and_then(Value::as_str)
                .unwrap_or("<no-ticker>");
            warn!("[Polymarket] Failed to parse event {}: {}", ticker, e);
            return None;
        }
    };

    let markets = raw
        .get("markets")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let (contracts, _) = collect_contracts(markets, &event, polymarket::decode_market);

    Some(Bundle::new(Platform::Polymarket, event, contracts))
}

/// Bundles from a Gamma `GET /events` list. Events without markets are
/// dropped before decoding.
pub fn polymarket_bundles(events: &[Value]) -> Vec<Bundle> {
    events
        .iter()
        .filter(|e| polymarket::has_markets(e))
        .filter_map(polymarket_bundle)
        .collect()
}

/// Attach fetched books to the bundle's contracts, position by position.
///
/// `books[i]` belongs to `bundle.contracts[i]`; missing trailing entries count
/// as failures. Returns the number of books fetched successfully.
pub fn attach_order_books<E: Display>(
    bundle: &mut Bundle,
    books: Vec<Result<OrderBook, E>>,
    missing: MissingBook,
) -> usize {
    let mut books = books.into_iter();
    let mut attached = 0;

    for contract in bundle.contracts.iter_mut() {
        match books.next() {
            Some(Ok(book)) => {
                if contract.attach_order_book(book) {
                    attached += 1;
                }
            }
            failure => {
                let reason = match failure {
                    Some(Err(e)) => e.to_string(),
                    _ => "no book returned".to_string(),
                };
                warn!(
                    "[{}] Failed to fetch order book for {}: {}",
                    bundle.platform, contract.ticker, reason
                );
                if missing == MissingBook::Empty {
                    contract.attach_order_book(OrderBook::empty());
                }
            }
        }
    }

    attached
}
