//! Run a single refresh cycle and print the snapshot.
//!
//! Usage: fetch_once [config.toml] [--json]

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use predwatch_rs::config::{Config, DEFAULT_PATH};
use predwatch_rs::refresh::Refresher;
use predwatch_rs::{display, telemetry, SnapshotStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .or_else(|| std::env::var("PREDWATCH_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_PATH.to_string());

    let cfg = Config::load(&path)?;
    telemetry::init(&cfg.general.log_level);

    let store = Arc::new(SnapshotStore::new());
    let refresher = Refresher::new(&path, Arc::clone(&store));

    let start = Instant::now();
    let report = refresher.run_cycle().await;
    let elapsed_ms = start.elapsed().as_millis();

    if report.published.is_none() {
        return Err(anyhow!("cycle published nothing (see log)"));
    }

    let snap = store.load();
    if json {
        println!("{}", serde_json::to_string_pretty(&*snap)?);
    } else {
        print!("{}", display::render(&snap));
        println!("Cycle took {}ms", elapsed_ms);
    }

    Ok(())
}
