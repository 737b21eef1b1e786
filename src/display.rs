//! Plain-text rendering of a snapshot. Absent values print as "N/A".

use std::fmt::Write;

use crate::state::{Bundle, Contract, Snapshot};
use crate::types::Platform;

pub const NOT_AVAILABLE: &str = "N/A";

/// Cents with one decimal, or N/A.
pub fn price(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}", v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Strike range like `[4, +inf)`.
pub fn strike_range(contract: &Contract) -> String {
    let lower = if contract.strike_lower.is_finite() {
        format!("[{}", contract.strike_lower)
    } else {
        "(-inf".to_string()
    };
    let upper = if contract.strike_upper.is_finite() {
        format!("{}]", contract.strike_upper)
    } else {
        "+inf)".to_string()
    };
    format!("{}, {}", lower, upper)
}

pub fn contract_line(contract: &Contract) -> String {
    let book = contract.order_book();
    format!(
        "  {:<32} yes {}/{}  no {}/{}  last {}  avg100 yes {} no {}  strike {}",
        contract.ticker,
        price(contract.yes_bid),
        price(contract.yes_ask),
        price(contract.no_bid),
        price(contract.no_ask),
        price(contract.last_price),
        price(book.and_then(|b| b.yes_avg_price_100)),
        price(book.and_then(|b| b.no_avg_price_100)),
        strike_range(contract),
    )
}

pub fn bundle_block(bundle: &Bundle) -> String {
    let mut out = format!(
        "[{}] {} ({}) - {} contracts\n",
        bundle.platform,
        bundle.event.title,
        bundle.event.ticker,
        bundle.contracts.len()
    );
    for c in &bundle.contracts {
        out.push_str(&contract_line(c));
        out.push('\n');
    }
    out
}

/// Whole snapshot, platform by platform.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let when = snapshot
        .refreshed_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let _ = writeln!(out, "Snapshot #{} at {}", snapshot.cycle, when);

    for platform in Platform::ALL {
        let bundles = snapshot.bundles(platform);
        if bundles.is_empty() {
            let _ = writeln!(out, "[{}] not found", platform);
            continue;
        }
        for b in bundles {
            out.push_str(&bundle_block(b));
        }
    }
    out
}
