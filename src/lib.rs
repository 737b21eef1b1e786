pub mod api;
pub mod assemble;
pub mod config;
pub mod display;
pub mod normalize;
pub mod refresh;
pub mod state;
pub mod telemetry;
pub mod types;

pub use state::{Bundle, Contract, MarketEvent, OrderBook, Snapshot, SnapshotStore};
pub use types::{Platform, Side};

/// Config path: first CLI argument, then `PREDWATCH_CONFIG`, then `config.toml`.
pub fn config_path_from_env() -> std::path::PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PREDWATCH_CONFIG").ok())
        .unwrap_or_else(|| config::DEFAULT_PATH.to_string())
        .into()
}
