//! Polymarket payloads (Gamma events, CLOB books). Prices arrive as 0-1
//! probabilities and are rescaled to cents.

use serde_json::Value;

use super::time::first_datetime;
use super::value::{as_object, first_f64, loose_f64, opt_f64, opt_str, required_str};
use super::DecodeError;
use crate::state::{Contract, Level, MarketEvent, OrderBook, CLOB_TOKEN_IDS};
use crate::types::{Platform, PriceUnits};

/// 0-1 probability to cents. Rounded to drop float noise (0.45 * 100).
pub fn to_cents(p: f64) -> f64 {
    (p * 100.0 * 1e6).round() / 1e6
}

/// True if the event carries a non-empty `markets` array.
pub fn has_markets(event: &Value) -> bool {
    event
        .get("markets")
        .and_then(Value::as_array)
        .is_some_and(|m| !m.is_empty())
}

pub fn decode_event(value: &Value) -> Result<MarketEvent, DecodeError> {
    let obj = as_object(value, "event")?;

    let ticker = opt_str(obj, "ticker")
        .or_else(|| opt_str(obj, "slug"))
        .ok_or(DecodeError::MissingField("ticker"))?;

    Ok(MarketEvent {
        platform: Platform::Polymarket,
        title: required_str(obj, "title")?,
        ticker,
        category: opt_str(obj, "category"),
        strike_date: first_datetime(obj, &["endDate"]),
        mutually_exclusive: true,
        sub_title: opt_str(obj, "description"),
    })
}

/// Parse a field that holds a JSON-encoded list (`"[\"a\", \"b\"]"`) or a
/// plain array.
fn encoded_list(value: &Value, field: &'static str) -> Result<Value, DecodeError> {
    match value {
        Value::Array(_) => Ok(value.clone()),
        Value::String(s) => {
            let parsed: Vec<Value> =
                serde_json::from_str(s).map_err(|e| DecodeError::InvalidField {
                    field,
                    reason: e.to_string(),
                })?;
            Ok(Value::Array(parsed))
        }
        other => Err(DecodeError::InvalidField {
            field,
            reason: format!("expected list, got {}", other),
        }),
    }
}

/// Decode one Gamma market into a contract.
///
/// Only one quote pair is exposed (`bestBid`/`bestAsk` for YES); the NO
/// quotes are its complement.
pub fn decode_market(value: &Value, event: &MarketEvent) -> Result<Contract, DecodeError> {
    let obj = as_object(value, "market")?;

    let mut c = Contract::new(
        Platform::Polymarket,
        required_str(obj, "conditionId")?,
        required_str(obj, "question")?,
        event.ticker.clone(),
    );
    c.category = opt_str(obj, "category");

    c.open_time = first_datetime(obj, &["startDate", "startDateIso"]);
    c.close_time = first_datetime(obj, &["endDate"]);
    c.expiration_time = first_datetime(obj, &["endDateIso", "endDate"]);

    c.yes_bid = opt_f64(obj, "bestBid")?.map(to_cents);
    c.yes_ask = opt_f64(obj, "bestAsk")?.map(to_cents);
    c.no_bid = c.yes_ask.map(|a| 100.0 - a);
    c.no_ask = c.yes_bid.map(|b| 100.0 - b);
    c.last_price = opt_f64(obj, "lastTradePrice")?.map(to_cents);

    c.open_interest = opt_f64(obj, "openInterest")?;
    c.volume = first_f64(obj, &["volumeNum", "volume"])?;
    c.volume_24h = first_f64(obj, &["volume24hr", "volume24hrClob"])?;

    c.rules_primary = opt_str(obj, "description");
    c.price_units = PriceUnits::UsdCent;

    if let Some(raw) = obj.get("clobTokenIds").filter(|v| !v.is_null()) {
        c.extra
            .insert(CLOB_TOKEN_IDS.to_string(), encoded_list(raw, "clobTokenIds")?);
    }
    if let Some(raw) = obj.get("outcomes").filter(|v| !v.is_null()) {
        c.extra
            .insert("outcomes".to_string(), encoded_list(raw, "outcomes")?);
    }
    if let Some(slug) = opt_str(obj, "slug") {
        c.extra.insert("slug".to_string(), Value::String(slug));
    }

    Ok(c)
}

fn decode_levels(side: Option<&Value>) -> Vec<Level> {
    side.and_then(Value::as_array)
        .map(|levels| {
            levels
                .iter()
                .filter_map(|l| {
                    let price = loose_f64(l.get("price")?)?;
                    let size = loose_f64(l.get("size")?)?;
                    Some(Level::new(to_cents(price), size))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Decode a CLOB `/book` response.
///
/// YES side = bids. NO side = asks mirrored: an ask on YES at p is a bid on
/// NO at 100 - p.
pub fn decode_order_book(value: &Value) -> Result<OrderBook, DecodeError> {
    let obj = as_object(value, "book")?;

    let yes = decode_levels(obj.get("bids"));
    let no = decode_levels(obj.get("asks"))
        .into_iter()
        .map(|l| Level::new(100.0 - l.price, l.quantity))
        .collect();

    Ok(OrderBook::new(yes, no))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> MarketEvent {
        decode_event(&json!({
            "ticker": "fed-decision-in-december",
            "slug": "fed-decision-in-december",
            "title": "Fed decision in December?",
            "description": "Resolves per FOMC statement.",
            "endDate": "2025-12-10T12:00:00Z",
            "markets": []
        }))
        .unwrap()
    }

    #[test]
    fn test_event_fields() {
        let e = event();
        assert_eq!(e.platform, Platform::Polymarket);
        assert_eq!(e.ticker, "fed-decision-in-december");
        assert!(e.mutually_exclusive);
        assert!(e.strike_date.is_some());
        assert_eq!(e.sub_title.as_deref(), Some("Resolves per FOMC statement."));
    }

    #[test]
    fn test_event_bad_end_date_is_absent() {
        let e = decode_event(&json!({"ticker": "x", "title": "t", "endDate": "whenever"})).unwrap();
        assert_eq!(e.strike_date, None);
    }

    #[test]
    fn test_has_markets() {
        assert!(has_markets(&json!({"markets": [{}]})));
        assert!(!has_markets(&json!({"markets": []})));
        assert!(!has_markets(&json!({"title": "x"})));
    }

    #[test]
    fn test_complement_pricing() {
        let m = json!({
            "conditionId": "0xabc",
            "question": "25 bps cut?",
            "bestBid": 0.40,
            "bestAsk": 0.45,
            "lastTradePrice": 0.42,
            "volume": "12345.6",
            "volume24hr": 800.5,
            "clobTokenIds": "[\"111\", \"222\"]",
            "outcomes": "[\"Yes\", \"No\"]",
            "slug": "25-bps-cut"
        });
        let c = decode_market(&m, &event()).unwrap();

        assert_eq!(c.yes_bid, Some(40.0));
        assert_eq!(c.yes_ask, Some(45.0));
        assert_eq!(c.no_bid, Some(55.0));
        assert_eq!(c.no_ask, Some(60.0));
        assert_eq!(c.last_price, Some(42.0));
        assert_eq!(c.volume, Some(12345.6));
        assert_eq!(c.volume_24h, Some(800.5));
        assert_eq!(c.event_ticker, "fed-decision-in-december");
        assert_eq!(c.primary_token_id(), Some("111".to_string()));
        assert_eq!(c.extra.get("slug"), Some(&json!("25-bps-cut")));
        assert_eq!(c.strike_upper, f64::INFINITY);
        assert_eq!(c.strike_lower, f64::NEG_INFINITY);
    }

    #[test]
    fn test_missing_quotes_stay_absent() {
        let m = json!({"conditionId": "0xabc", "question": "q"});
        let c = decode_market(&m, &event()).unwrap();
        assert_eq!(c.yes_bid, None);
        assert_eq!(c.no_ask, None);
        assert!(c.token_ids().is_empty());
    }

    #[test]
    fn test_market_without_condition_id_fails() {
        let m = json!({"question": "q"});
        assert_eq!(
            decode_market(&m, &event()).unwrap_err(),
            DecodeError::MissingField("conditionId")
        );
    }

    #[test]
    fn test_bad_token_ids_fail() {
        let m = json!({"conditionId": "0xabc", "question": "q", "clobTokenIds": "[oops"});
        assert!(decode_market(&m, &event()).is_err());
    }

    #[test]
    fn test_book_ask_becomes_no_bid() {
        let book = decode_order_book(&json!({
            "bids": [],
            "asks": [{"price": 0.3, "size": 10}]
        }))
        .unwrap();
        assert_eq!(book.no(), &[Level::new(70.0, 10.0)]);
        assert!(book.yes().is_empty());
    }

    #[test]
    fn test_book_rescaled_and_sorted() {
        let book = decode_order_book(&json!({
            "market": "0xabc",
            "asset_id": "111",
            "bids": [
                {"price": "0.38", "size": "50"},
                {"price": "0.40", "size": "60"},
                {"price": "bad", "size": "1"}
            ],
            "asks": [
                {"price": "0.45", "size": "30"},
                {"price": "0.47", "size": "100"}
            ]
        }))
        .unwrap();

        let yes: Vec<f64> = book.yes().iter().map(|l| l.price).collect();
        assert_eq!(yes, vec![40.0, 38.0]);
        let no: Vec<f64> = book.no().iter().map(|l| l.price).collect();
        assert_eq!(no, vec![55.0, 53.0]);

        // Buying 100 YES lifts the asks: 30 @ 45 + 70 @ 47
        let expected = (45.0 * 30.0 + 47.0 * 70.0) / 100.0;
        assert!((book.yes_avg_price_100.unwrap() - expected).abs() < 1e-9);
        // Only 110 on the bid side: 60 @ 60 + 40 @ 62
        let expected = (60.0 * 60.0 + 62.0 * 40.0) / 100.0;
        assert!((book.no_avg_price_100.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_book_decimal_ask_sizes_fill_target() {
        // Sizes total 100.00 but do not sum to exactly 100.0 as f64.
        let book = decode_order_book(&json!({
            "bids": [],
            "asks": [
                {"price": "0.45", "size": "1.02"},
                {"price": "0.46", "size": "8.03"},
                {"price": "0.47", "size": "47.05"},
                {"price": "0.48", "size": "43.41"},
                {"price": "0.49", "size": "0.49"}
            ]
        }))
        .unwrap();

        let expected =
            (45.0 * 1.02 + 46.0 * 8.03 + 47.0 * 47.05 + 48.0 * 43.41 + 49.0 * 0.49) / 100.0;
        let avg = book.yes_avg_price_100.expect("asks cover 100 contracts");
        assert!((avg - expected).abs() < 1e-6);
    }
}
