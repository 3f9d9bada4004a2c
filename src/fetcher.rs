use std::time::Duration;

use serde_json::Value;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::Result;
use crate::resolver::Catalog;
use crate::sampler::{QuoteSource, Side};

/// Shared client settings for every upstream this process talks to.
pub fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?)
}

/// Prices come back as JSON numbers from some endpoints and decimal strings from others.
pub fn parse_number(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

async fn get_json(client: &reqwest::Client, url: &str, query: &[(&str, &str)]) -> Result<Value> {
    let value = client
        .get(url)
        .query(query)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(value)
}

// ---------------------------------------------------------------------------
// Gamma catalog
// ---------------------------------------------------------------------------

/// Market catalog over the Gamma REST API.
pub struct GammaClient {
    client: reqwest::Client,
    base_url: String,
}

impl GammaClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Catalog for GammaClient {
    async fn events_by_slug(&self, slug: &str) -> Result<Value> {
        let url = format!("{}/events", self.base_url);
        get_json(&self.client, &url, &[("slug", slug)]).await
    }

    async fn active_markets(&self, event_id: &str) -> Result<Value> {
        let url = format!("{}/markets", self.base_url);
        get_json(&self.client, &url, &[("event_id", event_id), ("active", "true")]).await
    }

    async fn market_detail(&self, market_id: &str) -> Result<Value> {
        let url = format!("{}/markets/{}", self.base_url, market_id);
        get_json(&self.client, &url, &[]).await
    }
}

// ---------------------------------------------------------------------------
// CLOB quotes
// ---------------------------------------------------------------------------

/// Per-side token prices from the CLOB `/price` endpoint.
pub struct ClobClient {
    client: reqwest::Client,
    base_url: String,
}

impl ClobClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl QuoteSource for ClobClient {
    async fn quote(&self, token_id: &str, side: Side) -> Result<f64> {
        let url = format!("{}/price", self.base_url);
        let resp = get_json(
            &self.client,
            &url,
            &[("token_id", token_id), ("side", side.as_str())],
        )
        .await?;
        Ok(parse_quote_price(&resp))
    }
}

/// `{"price": "0.61"}`. A missing or unparseable price reads as 0.
fn parse_quote_price(resp: &Value) -> f64 {
    resp.get("price").and_then(parse_number).unwrap_or(0.0)
}
