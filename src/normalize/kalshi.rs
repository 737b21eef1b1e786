//! Kalshi payloads. Prices are already cents on a 0-100 scale.

use serde::Deserialize;
use serde_json::Value;

use super::time::first_datetime;
use super::value::{as_object, first_f64, loose_f64, opt_f64, opt_str, required_str, Object};
use super::DecodeError;
use crate::state::{Contract, Level, MarketEvent, OrderBook};
use crate::types::{Platform, PriceUnits};

/// How `floor_strike`/`cap_strike` map onto the contract's strike bounds.
///
/// Two revisions of the payload handling disagree, so the choice is explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeMapping {
    /// `greater`: upper = floor. `less`: lower = cap. Other bound unbounded.
    #[default]
    FloorAsUpper,
    /// `greater`: lower = floor. `less`: upper = cap. `between`: [floor, cap].
    FloorAsLower,
}

/// (upper, lower) strike bounds. Missing bounds are +inf / -inf.
pub fn strike_bounds(
    mapping: StrikeMapping,
    strike_type: Option<&str>,
    floor: Option<f64>,
    cap: Option<f64>,
) -> (f64, f64) {
    let up = |v: Option<f64>| v.unwrap_or(f64::INFINITY);
    let down = |v: Option<f64>| v.unwrap_or(f64::NEG_INFINITY);

    match (mapping, strike_type) {
        (StrikeMapping::FloorAsUpper, Some("greater")) => (up(floor), f64::NEG_INFINITY),
        (StrikeMapping::FloorAsUpper, Some("less")) => (f64::INFINITY, down(cap)),
        (StrikeMapping::FloorAsLower, Some("greater")) => (f64::INFINITY, down(floor)),
        (StrikeMapping::FloorAsLower, Some("less")) => (up(cap), f64::NEG_INFINITY),
        (StrikeMapping::FloorAsLower, Some("between")) => (up(cap), down(floor)),
        _ => (f64::INFINITY, f64::NEG_INFINITY),
    }
}

/// Decode the `event` object of a `GET /events/{ticker}` response.
pub fn decode_event(value: &Value) -> Result<MarketEvent, DecodeError> {
    let obj = as_object(value, "event")?;

    let ticker = opt_str(obj, "series_ticker")
        .or_else(|| opt_str(obj, "event_ticker"))
        .ok_or(DecodeError::MissingField("series_ticker/event_ticker"))?;

    Ok(MarketEvent {
        platform: Platform::Kalshi,
        title: required_str(obj, "title")?,
        ticker,
        category: opt_str(obj, "category"),
        strike_date: first_datetime(obj, &["strike_date"]),
        mutually_exclusive: obj
            .get("mutually_exclusive")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        sub_title: opt_str(obj, "sub_title"),
    })
}

/// Markets of an event response: top-level `markets`, else `event.markets`.
pub fn event_markets(payload: &Value) -> &[Value] {
    payload
        .get("markets")
        .and_then(Value::as_array)
        .or_else(|| payload.get("event")?.get("markets")?.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Cent price, falling back to the `<field>_dollars` variant.
fn price(obj: &Object, cents: &'static str, dollars: &'static str) -> Result<Option<f64>, DecodeError> {
    if let Some(c) = opt_f64(obj, cents)? {
        return Ok(Some(c));
    }
    Ok(opt_f64(obj, dollars)?.map(|d| d * 100.0))
}

/// Decode one market of an event into a contract.
pub fn decode_market(
    value: &Value,
    event: &MarketEvent,
    mapping: StrikeMapping,
) -> Result<Contract, DecodeError> {
    let obj = as_object(value, "market")?;

    let mut c = Contract::new(
        Platform::Kalshi,
        required_str(obj, "ticker")?,
        required_str(obj, "title")?,
        event.ticker.clone(),
    );
    c.category = opt_str(obj, "category");

    c.open_time = first_datetime(obj, &["open_time"]);
    c.close_time = first_datetime(obj, &["close_time"]);
    c.expiration_time = first_datetime(obj, &["expiration_time", "latest_expiration_time"]);
    c.expected_expiration_time = first_datetime(obj, &["expected_expiration_time"]);

    c.yes_bid = price(obj, "yes_bid", "yes_bid_dollars")?;
    c.yes_ask = price(obj, "yes_ask", "yes_ask_dollars")?;
    c.no_bid = price(obj, "no_bid", "no_bid_dollars")?;
    c.no_ask = price(obj, "no_ask", "no_ask_dollars")?;
    c.last_price = price(obj, "last_price", "last_price_dollars")?;

    c.open_interest = first_f64(obj, &["open_interest", "open_interest_fp"])?;
    c.volume = first_f64(obj, &["volume", "volume_fp"])?;
    c.volume_24h = first_f64(obj, &["volume_24h", "volume_24h_fp"])?;

    c.strike_type = opt_str(obj, "strike_type");
    let (upper, lower) = strike_bounds(
        mapping,
        c.strike_type.as_deref(),
        opt_f64(obj, "floor_strike")?,
        opt_f64(obj, "cap_strike")?,
    );
    c.strike_upper = upper;
    c.strike_lower = lower;

    c.rules_primary = opt_str(obj, "rules_primary");
    c.rules_secondary = opt_str(obj, "rules_secondary");
    c.price_units = opt_str(obj, "response_price_units")
        .map(|t| PriceUnits::from_tag(&t))
        .unwrap_or_default();

    Ok(c)
}

/// Keep well-formed `[price, quantity]` pairs.
fn decode_side(side: Option<&Value>, field: &'static str) -> Result<Vec<Level>, DecodeError> {
    let levels = match side {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(levels)) => levels,
        Some(other) => {
            return Err(DecodeError::InvalidField {
                field,
                reason: format!("expected array, got {}", other),
            })
        }
    };

    Ok(levels
        .iter()
        .filter_map(|level| match level.as_array().map(Vec::as_slice) {
            Some([p, q]) => Some(Level::new(loose_f64(p)?, loose_f64(q)?)),
            _ => None,
        })
        .collect())
}

/// Decode a `GET /markets/{ticker}/orderbook` response (or its inner
/// `orderbook` object).
pub fn decode_order_book(value: &Value) -> Result<OrderBook, DecodeError> {
    let inner = value.get("orderbook").unwrap_or(value);
    let obj = as_object(inner, "orderbook")?;
    let yes = decode_side(obj.get("yes"), "yes")?;
    let no = decode_side(obj.get("no"), "no")?;
    Ok(OrderBook::new(yes, no))
}
