//! Structured logging setup.
//!
//! `RUST_LOG` wins over the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Compact human-readable output.
pub fn init(default_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(default_level))
        .with(fmt::layer().with_target(false).compact())
        .try_init();
}

/// JSON lines, for log shipping.
pub fn init_json(default_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(default_level))
        .with(fmt::layer().json())
        .try_init();
}
