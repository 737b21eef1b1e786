use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

use super::book::OrderBook;
use crate::types::{Platform, PriceUnits};

/// Side-channel key for the Polymarket CLOB token ids.
pub const CLOB_TOKEN_IDS: &str = "clob_token_ids";

/// A single yes/no tradable market inside an event.
///
/// All prices are cents on a 0-100 scale. Built once per cycle; the only
/// later mutation is attaching the order book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contract {
    pub platform: Platform,
    pub ticker: String,
    pub title: String,
    pub category: Option<String>,
    /// Ticker of the owning event. Resolve through `Bundle::event`.
    pub event_ticker: String,

    pub open_time: Option<DateTime<Utc>>,
    pub close_time: Option<DateTime<Utc>>,
    pub expiration_time: Option<DateTime<Utc>>,
    pub expected_expiration_time: Option<DateTime<Utc>>,

    pub yes_bid: Option<f64>,
    pub yes_ask: Option<f64>,
    pub no_bid: Option<f64>,
    pub no_ask: Option<f64>,
    pub last_price: Option<f64>,

    pub open_interest: Option<f64>,
    pub volume: Option<f64>,
    pub volume_24h: Option<f64>,

    pub strike_type: Option<String>,
    /// +inf when unbounded.
    #[serde(serialize_with = "serialize_bound")]
    pub strike_upper: f64,
    /// -inf when unbounded.
    #[serde(serialize_with = "serialize_bound")]
    pub strike_lower: f64,

    pub rules_primary: Option<String>,
    pub rules_secondary: Option<String>,

    pub price_units: PriceUnits,
    /// Platform-specific fields (e.g. CLOB token ids).
    pub extra: HashMap<String, Value>,

    order_book: Option<OrderBook>,
}

impl Contract {
    /// Contract with the given identity and every optional field empty.
    pub fn new(platform: Platform, ticker: String, title: String, event_ticker: String) -> Self {
        Self {
            platform,
            ticker,
            title,
            category: None,
            event_ticker,
            open_time: None,
            close_time: None,
            expiration_time: None,
            expected_expiration_time: None,
            yes_bid: None,
            yes_ask: None,
            no_bid: None,
            no_ask: None,
            last_price: None,
            open_interest: None,
            volume: None,
            volume_24h: None,
            strike_type: None,
            strike_upper: f64::INFINITY,
            strike_lower: f64::NEG_INFINITY,
            rules_primary: None,
            rules_secondary: None,
            price_units: PriceUnits::UsdCent,
            extra: HashMap::new(),
            order_book: None,
        }
    }

    pub fn order_book(&self) -> Option<&OrderBook> {
        self.order_book.as_ref()
    }

    /// Attach the order book. Only the first call has an effect; returns
    /// false if a book was already attached.
    pub fn attach_order_book(&mut self, book: OrderBook) -> bool {
        if self.order_book.is_some() {
            return false;
        }
        self.order_book = Some(book);
        true
    }

    /// True if `value` falls inside [strike_lower, strike_upper].
    pub fn strike_contains(&self, value: f64) -> bool {
        self.strike_lower <= value && value <= self.strike_upper
    }

    /// CLOB token ids from the side-channel map, in payload order.
    pub fn token_ids(&self) -> Vec<String> {
        match self.extra.get(CLOB_TOKEN_IDS) {
            Some(Value::Array(ids)) => ids
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Token id used for the book lookup (the first one).
    pub fn primary_token_id(&self) -> Option<String> {
        self.token_ids().into_iter().next()
    }
}

/// JSON has no infinity, so unbounded strikes are written as "+inf" / "-inf".
fn serialize_bound<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() {
        serializer.serialize_str(if *value > 0.0 { "+inf" } else { "-inf" })
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::book::Level;
    use serde_json::json;

    fn contract() -> Contract {
        Contract::new(
            Platform::Kalshi,
            "KXBTC-25-T100".to_string(),
            "BTC above 100k".to_string(),
            "KXBTC".to_string(),
        )
    }

    #[test]
    fn test_default_bounds_are_infinite() {
        let c = contract();
        assert_eq!(c.strike_upper, f64::INFINITY);
        assert_eq!(c.strike_lower, f64::NEG_INFINITY);
        assert!(c.strike_contains(1e12));
        assert!(c.strike_contains(-1e12));
    }

    #[test]
    fn test_order_book_attached_once() {
        let mut c = contract();
        assert!(c.order_book().is_none());

        let first = OrderBook::new(vec![Level::new(40.0, 10.0)], vec![]);
        assert!(c.attach_order_book(first.clone()));
        assert!(!c.attach_order_book(OrderBook::empty()));
        assert_eq!(c.order_book(), Some(&first));
    }

    #[test]
    fn test_token_ids() {
        let mut c = contract();
        assert_eq!(c.primary_token_id(), None);

        c.extra
            .insert(CLOB_TOKEN_IDS.to_string(), json!(["111", "222"]));
        assert_eq!(c.token_ids(), vec!["111", "222"]);
        assert_eq!(c.primary_token_id(), Some("111".to_string()));
    }

    #[test]
    fn test_json_keeps_infinite_bounds() {
        let mut c = contract();
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["strike_upper"], json!("+inf"));
        assert_eq!(v["strike_lower"], json!("-inf"));

        c.strike_lower = 100000.0;
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["strike_lower"], json!(100000.0));
        assert_eq!(v["strike_upper"], json!("+inf"));
    }
}
