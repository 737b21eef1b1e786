mod book;
mod bundle;
mod contract;
mod event;
mod snapshot;

pub use book::{avg_fill_price, Level, OrderBook, FILL_TARGET};
pub use bundle::Bundle;
pub use contract::{Contract, CLOB_TOKEN_IDS};
pub use event::MarketEvent;
pub use snapshot::{Snapshot, SnapshotStore};
