use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::api::gamma::{CLOB_BASE, GAMMA_BASE};
use crate::api::kalshi::{DEFAULT_DEPTH, KALSHI_BASE};
use crate::normalize::StrikeMapping;

pub const DEFAULT_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub kalshi: KalshiConfig,
    #[serde(default)]
    pub polymarket: PolymarketConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct General {
    pub log_level: String,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            refresh_interval_secs: 30,
            request_timeout_secs: 10,
        }
    }
}

impl General {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KalshiConfig {
    pub base_url: String,
    pub event_tickers: Vec<String>,
    pub orderbook_depth: u32,
    pub strike_mapping: StrikeMapping,
}

impl Default for KalshiConfig {
    fn default() -> Self {
        Self {
            base_url: KALSHI_BASE.to_string(),
            event_tickers: Vec::new(),
            orderbook_depth: DEFAULT_DEPTH,
            strike_mapping: StrikeMapping::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolymarketConfig {
    pub gamma_url: String,
    pub clob_url: String,
    pub event_slugs: Vec<String>,
    /// Value sent as `closed`. Unset keeps the open-only default; `true`
    /// returns closed events only.
    pub closed: Option<bool>,
    /// Extra `GET /events` params. Override defaults of the same name.
    pub params: BTreeMap<String, String>,
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            gamma_url: GAMMA_BASE.to_string(),
            clob_url: CLOB_BASE.to_string(),
            event_slugs: Vec::new(),
            closed: None,
            params: BTreeMap::new(),
        }
    }
}

impl PolymarketConfig {
    /// Caller params for the event query.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = Vec::new();
        if let Some(closed) = self.closed {
            params.push(("closed".to_string(), closed.to_string()));
        }
        params.extend(self.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }
}

/// Non-empty, trimmed entries. Empty means "skip this platform".
pub fn clean_list(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
