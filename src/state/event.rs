use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::Platform;

/// Event identity - one per event ticker/slug per refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketEvent {
    pub platform: Platform,
    pub title: String,
    /// Series ticker (Kalshi) or event ticker (Polymarket).
    pub ticker: String,
    pub category: Option<String>,
    pub strike_date: Option<DateTime<Utc>>,
    /// At most one contract in the event can resolve YES.
    pub mutually_exclusive: bool,
    pub sub_title: Option<String>,
}
