//! Periodic refresh driver.
//!
//! One cycle = re-read config, fetch both platforms concurrently, publish a
//! new snapshot. Cycles never overlap: the next one starts `interval` after
//! the previous one finished.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::gamma::GammaClient;
use crate::api::http_client;
use crate::api::kalshi::KalshiClient;
use crate::config::{clean_list, Config, General};
use crate::state::{Bundle, Snapshot, SnapshotStore};
use crate::types::Platform;

/// What a cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Cycle number of the published snapshot, None if nothing was published.
    pub published: Option<u64>,
    /// Platforms whose bundles were carried over from the previous snapshot.
    pub stale: Vec<Platform>,
    /// Sleep before the next cycle.
    pub next_interval: Duration,
}

pub struct Refresher {
    config_path: PathBuf,
    store: Arc<SnapshotStore>,
}

impl Refresher {
    pub fn new(config_path: impl Into<PathBuf>, store: Arc<SnapshotStore>) -> Self {
        Self {
            config_path: config_path.into(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Run one full fetch-normalize-assemble pass and publish the result.
    pub async fn run_cycle(&self) -> CycleReport {
        let fallback_interval = General::default().refresh_interval();

        let config = match Config::load(&self.config_path) {
            Ok(c) => c,
            Err(e) => {
                error!("Config error, keeping previous snapshot: {:#}", e);
                return CycleReport {
                    published: None,
                    stale: Platform::ALL.to_vec(),
                    next_interval: fallback_interval,
                };
            }
        };
        let next_interval = config.general.refresh_interval();

        let client = match http_client(config.general.request_timeout()) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to build HTTP client: {}", e);
                return CycleReport {
                    published: None,
                    stale: Platform::ALL.to_vec(),
                    next_interval,
                };
            }
        };

        let previous = self.store.load();
        let cycle = previous.cycle + 1;

        let tickers = clean_list(&config.kalshi.event_tickers);
        let slugs = clean_list(&config.polymarket.event_slugs);

        let kalshi = async {
            if tickers.is_empty() {
                warn!("[Kalshi] No event tickers configured, skipping");
                return None;
            }
            let k = KalshiClient::new(client.clone(), config.kalshi.base_url.clone());
            Some(
                k.load_bundles(&tickers, config.kalshi.orderbook_depth, config.kalshi.strike_mapping)
                    .await,
            )
        };

        let polymarket = async {
            if slugs.is_empty() {
                warn!("[Polymarket] No event slugs configured, skipping");
                return None;
            }
            let g = GammaClient::new(
                client.clone(),
                config.polymarket.gamma_url.clone(),
                config.polymarket.clob_url.clone(),
            );
            Some(g.load_bundles(&slugs, &config.polymarket.query_params()).await)
        };

        let (kalshi, polymarket) = tokio::join!(kalshi, polymarket);

        let mut snapshot = Snapshot::new(cycle, Utc::now());
        let mut stale = Vec::new();
        for (platform, bundles) in [
            (Platform::Kalshi, kalshi),
            (Platform::Polymarket, polymarket),
        ] {
            place(&mut snapshot, &previous, platform, bundles, &mut stale);
        }

        info!(
            "Cycle {}: {} bundles, {} contracts{}",
            cycle,
            snapshot.total_bundles(),
            snapshot.total_contracts(),
            if stale.is_empty() { "" } else { " (some platforms stale)" }
        );
        self.store.publish(snapshot);

        CycleReport {
            published: Some(cycle),
            stale,
            next_interval,
        }
    }

    /// Run cycles until `shutdown` flips to true. Only the sleep between
    /// cycles is interruptible; a running cycle always completes.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Refresh loop started ({})", self.config_path.display());
            loop {
                let report = self.run_cycle().await;

                if *shutdown.borrow() {
                    break;
                }
                tokio::select! {
                    _ = tokio::time::sleep(report.next_interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Refresh loop stopped");
        })
    }
}

fn place(
    snapshot: &mut Snapshot,
    previous: &Snapshot,
    platform: Platform,
    bundles: Option<Vec<Bundle>>,
    stale: &mut Vec<Platform>,
) {
    match bundles {
        Some(b) => snapshot.set_bundles(platform, b),
        None => {
            snapshot.carry_over(platform, previous);
            stale.push(platform);
        }
    }
}
