use futures_util::future::join_all;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{get_json, ApiError};
use crate::assemble::{self, MissingBook};
use crate::normalize::{kalshi, StrikeMapping};
use crate::state::{Bundle, OrderBook};
use crate::types::Platform;

pub const KALSHI_BASE: &str = "https://api.elections.kalshi.com/trade-api/v2";

/// Default number of levels requested per book side.
pub const DEFAULT_DEPTH: u32 = 5;

/// Read-only Kalshi market data client.
#[derive(Debug, Clone)]
pub struct KalshiClient {
    client: Client,
    base_url: String,
}

impl KalshiClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `GET /events/{ticker}?with_nested_markets=true`
    pub async fn get_event(&self, event_ticker: &str) -> Result<Value, ApiError> {
        let url = format!("{}/events/{}", self.base_url, event_ticker);
        let query = [("with_nested_markets".to_string(), "true".to_string())];
        get_json(&self.client, &url, &query).await
    }

    /// `GET /markets/{ticker}/orderbook?depth={depth}`, decoded.
    pub async fn get_order_book(&self, market_ticker: &str, depth: u32) -> Result<OrderBook, ApiError> {
        let url = format!("{}/markets/{}/orderbook", self.base_url, market_ticker);
        let query = [("depth".to_string(), depth.to_string())];
        let body = get_json(&self.client, &url, &query).await?;
        Ok(kalshi::decode_order_book(&body)?)
    }

    /// Fetch, decode and enrich one event. None if the event could not be
    /// fetched or parsed.
    pub async fn load_bundle(
        &self,
        event_ticker: &str,
        depth: u32,
        mapping: StrikeMapping,
    ) -> Option<Bundle> {
        let payload = match self.get_event(event_ticker).await {
            Ok(p) => p,
            Err(e) => {
                warn!("[Kalshi] Failed to process {}: {}", event_ticker, e);
                return None;
            }
        };

        let mut bundle = assemble::kalshi_bundle(&payload, mapping)?;

        let books = join_all(
            bundle
                .contracts
                .iter()
                .map(|c| self.get_order_book(&c.ticker, depth)),
        )
        .await;
        let attached =
            assemble::attach_order_books(&mut bundle, books, MissingBook::for_platform(Platform::Kalshi));

        debug!(
            "[Kalshi] {}: {} contracts, {} books",
            event_ticker,
            bundle.contracts.len(),
            attached
        );
        Some(bundle)
    }

    /// Bundles for every ticker that could be loaded, in ticker order.
    /// Never fails; a ticker that errors is logged and left out.
    pub async fn load_bundles(
        &self,
        event_tickers: &[String],
        depth: u32,
        mapping: StrikeMapping,
    ) -> Vec<Bundle> {
        let results = join_all(
            event_tickers
                .iter()
                .map(|t| self.load_bundle(t, depth, mapping)),
        )
        .await;

        let bundles: Vec<Bundle> = results.into_iter().flatten().collect();
        info!(
            "[Kalshi] Loaded {}/{} events",
            bundles.len(),
            event_tickers.len()
        );
        bundles
    }
}
