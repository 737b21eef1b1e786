use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::bundle::Bundle;
use crate::types::Platform;

/// Everything one refresh cycle produced. Never mutated after publishing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    /// Refresh cycle that produced this snapshot (0 = nothing published yet).
    pub cycle: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
    bundles: BTreeMap<Platform, Arc<Vec<Bundle>>>,
}

impl Snapshot {
    pub fn new(cycle: u64, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            cycle,
            refreshed_at: Some(refreshed_at),
            bundles: BTreeMap::new(),
        }
    }

    /// Bundles for a platform, in payload order. Empty if none.
    pub fn bundles(&self, platform: Platform) -> &[Bundle] {
        self.bundles
            .get(&platform)
            .map(|b| b.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_platform(&self, platform: Platform) -> bool {
        self.bundles.contains_key(&platform)
    }

    pub fn set_bundles(&mut self, platform: Platform, bundles: Vec<Bundle>) {
        self.bundles.insert(platform, Arc::new(bundles));
    }

    /// Reuse another snapshot's bundles for a platform (stale carry-over).
    pub fn carry_over(&mut self, platform: Platform, previous: &Snapshot) {
        if let Some(bundles) = previous.bundles.get(&platform) {
            self.bundles.insert(platform, Arc::clone(bundles));
        }
    }

    pub fn total_bundles(&self) -> usize {
        self.bundles.values().map(|b| b.len()).sum()
    }

    pub fn total_contracts(&self) -> usize {
        self.bundles
            .values()
            .flat_map(|b| b.iter())
            .map(|b| b.contracts.len())
            .sum()
    }

    pub fn find_event(&self, ticker: &str) -> Option<&Bundle> {
        self.bundles
            .values()
            .flat_map(|b| b.iter())
            .find(|b| b.event.ticker == ticker)
    }
}

/// Published snapshot shared between the refresh driver and readers.
///
/// Publishing swaps the whole `Arc`; readers clone the `Arc` and keep a
/// consistent view for as long as they hold it.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
