use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use predwatch_rs::config::Config;
use predwatch_rs::refresh::Refresher;
use predwatch_rs::{config_path_from_env, telemetry, Platform, SnapshotStore};
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let path = config_path_from_env();
    let cfg = Config::load(&path)?;
    if std::env::var("PREDWATCH_LOG_JSON").is_ok() {
        telemetry::init_json(&cfg.general.log_level);
    } else {
        telemetry::init(&cfg.general.log_level);
    }
    info!("Loaded config from {}", path.display());

    let store = Arc::new(SnapshotStore::new());
    let refresher = Arc::new(Refresher::new(&path, Arc::clone(&store)));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = refresher.spawn(shutdown_rx);

    // Stand-in for the dashboard: report whenever a new snapshot lands.
    let mut last_cycle = 0;
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snap = store.load();
                if snap.cycle == last_cycle {
                    continue;
                }
                last_cycle = snap.cycle;
                for platform in Platform::ALL {
                    let bundles = snap.bundles(platform);
                    let books: usize = bundles.iter().map(|b| b.books_attached()).sum();
                    info!(
                        "[{}] {} events, {} contracts, {} books",
                        platform,
                        bundles.len(),
                        bundles.iter().map(|b| b.contracts.len()).sum::<usize>(),
                        books
                    );
                }
            }
            _ = &mut ctrl_c => {
                info!("Shutting down...");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = handle.await {
        warn!("Refresh task ended abnormally: {}", e);
    }
    Ok(())
}
