use futures_util::future::join_all;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{get_json, ApiError};
use crate::assemble::{self, MissingBook};
use crate::normalize::polymarket;
use crate::state::{Bundle, Contract, OrderBook};
use crate::types::Platform;

pub const GAMMA_BASE: &str = "https://gamma-api.polymarket.com";
pub const CLOB_BASE: &str = "https://clob.polymarket.com";

/// Query for `GET /events`.
///
/// Starts from `closed=false`, adds one `slug` per slug, then applies the
/// caller's params: a key that matches a default replaces it, anything else
/// is appended.
pub fn event_query(slugs: &[String], params: &[(String, String)]) -> Vec<(String, String)> {
    let mut query = vec![("closed".to_string(), "false".to_string())];
    query.extend(slugs.iter().map(|s| ("slug".to_string(), s.clone())));

    for (key, value) in params {
        if key == "closed" {
            query.retain(|(k, _)| k != "closed");
        }
        query.push((key.clone(), value.clone()));
    }

    query
}

/// Polymarket client: Gamma for events, CLOB for books.
#[derive(Debug, Clone)]
pub struct GammaClient {
    client: Client,
    gamma_url: String,
    clob_url: String,
}

impl GammaClient {
    pub fn new(client: Client, gamma_url: impl Into<String>, clob_url: impl Into<String>) -> Self {
        Self {
            client,
            gamma_url: gamma_url.into().trim_end_matches('/').to_string(),
            clob_url: clob_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `GET /events` with the given query.
    pub async fn get_events(&self, query: &[(String, String)]) -> Result<Vec<Value>, ApiError> {
        let url = format!("{}/events", self.gamma_url);
        match get_json(&self.client, &url, query).await? {
            Value::Array(events) => Ok(events),
            other => Err(ApiError::Parse(format!(
                "expected an array of events, got {}",
                kind(&other)
            ))),
        }
    }

    /// `GET /book?token_id=...`, decoded.
    pub async fn get_order_book(&self, token_id: &str) -> Result<OrderBook, ApiError> {
        let url = format!("{}/book", self.clob_url);
        let query = [("token_id".to_string(), token_id.to_string())];
        let body = get_json(&self.client, &url, &query).await?;
        Ok(polymarket::decode_order_book(&body)?)
    }

    /// Book for a contract's first token id.
    async fn contract_book(&self, contract: &Contract) -> Result<OrderBook, ApiError> {
        let token_id = contract.primary_token_id().ok_or_else(|| {
            ApiError::Parse(format!("contract {} has no clob token ids", contract.ticker))
        })?;
        self.get_order_book(&token_id).await
    }

    /// Fetch events for the slugs, decode them, and attach a book to every
    /// contract (empty when the book is unavailable). Never fails.
    pub async fn load_bundles(&self, slugs: &[String], params: &[(String, String)]) -> Vec<Bundle> {
        let query = event_query(slugs, params);
        let events = match self.get_events(&query).await {
            Ok(events) => events,
            Err(e) => {
                warn!("[Polymarket] Failed to fetch events: {}", e);
                return Vec::new();
            }
        };
        debug!("[Polymarket] Gamma returned {} events", events.len());

        let mut bundles = assemble::polymarket_bundles(&events);

        let enriched = bundles.iter_mut().map(|bundle| async move {
            let books = join_all(bundle.contracts.iter().map(|c| self.contract_book(c))).await;
            assemble::attach_order_books(bundle, books, MissingBook::for_platform(Platform::Polymarket))
        });
        let attached: usize = join_all(enriched).await.into_iter().sum();

        info!(
            "[Polymarket] Loaded {} events, {} books",
            bundles.len(),
            attached
        );
        bundles
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
