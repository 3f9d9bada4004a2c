use serde_json::Value;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::feed::ReferenceFeed;
use crate::fetcher::{http_client, parse_number};
use crate::types::ReferenceQuote;

/// Spot prices from the Binance REST API.
///
/// Current price: `/api/v3/ticker/price`. Session open: the open of today's
/// daily kline (`/api/v3/klines?interval=1d&limit=1`, field 1), which is the
/// 00:00 UTC price.
pub struct BinanceFeed {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceFeed {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn try_fetch(&self, symbol: &str) -> Result<ReferenceQuote> {
        let ticker: Value = self
            .client
            .get(format!("{}/api/v3/ticker/price", self.base_url))
            .query(&[("symbol", symbol)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let current_price = parse_ticker_price(&ticker)?;

        let klines: Value = self
            .client
            .get(format!("{}/api/v3/klines", self.base_url))
            .query(&[("symbol", symbol), ("interval", "1d"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let open_price = parse_session_open(&klines)?;

        Ok(ReferenceQuote { open_price, current_price })
    }
}

impl ReferenceFeed for BinanceFeed {
    async fn fetch(&self, symbol: &str) -> Option<ReferenceQuote> {
        match self.try_fetch(symbol).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!(symbol, "Binance price fetch failed: {e}");
                None
            }
        }
    }
}

/// `{"symbol": "ETHUSDT", "price": "3401.27000000"}`
fn parse_ticker_price(v: &Value) -> Result<f64> {
    v.get("price")
        .and_then(parse_number)
        .ok_or_else(|| AppError::Upstream(format!("ticker response has no price: {v}")))
}

/// `[[open_time, "open", "high", "low", "close", ...]]`. An empty list means
/// no kline exists yet for today.
fn parse_session_open(v: &Value) -> Result<Option<f64>> {
    let klines = v
        .as_array()
        .ok_or_else(|| AppError::Upstream("klines response is not a list".to_string()))?;
    let Some(first) = klines.first() else {
        return Ok(None);
    };
    first
        .get(1)
        .and_then(parse_number)
        .map(Some)
        .ok_or_else(|| AppError::Upstream(format!("kline has no open price: {first}")))
}
