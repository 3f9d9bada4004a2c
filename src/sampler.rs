use tracing::warn;

use crate::error::Result;
use crate::types::PriceSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

/// Quoted price for one side of a token's book.
#[allow(async_fn_in_trait)]
pub trait QuoteSource {
    async fn quote(&self, token_id: &str, side: Side) -> Result<f64>;
}

/// Sample a single representative price for `token_id` from independent buy/sell quotes.
///
/// A side that fails to fetch counts as 0. `None` means no price this cycle.
pub async fn sample<Q: QuoteSource>(quotes: &Q, token_id: &str) -> Option<PriceSample> {
    let buy = quote_or_zero(quotes, token_id, Side::Buy).await;
    let sell = quote_or_zero(quotes, token_id, Side::Sell).await;
    combine(buy, sell)
}

/// Midpoint when both sides are usable, otherwise whichever side is.
///
/// A side is usable when it is a finite probability in (0, 1]; anything else
/// (0, negative, NaN, infinite, above 1) is treated as no quote.
pub fn combine(buy: f64, sell: f64) -> Option<PriceSample> {
    match (usable(buy), usable(sell)) {
        (true, true) => Some(PriceSample((buy + sell) / 2.0)),
        (true, false) => Some(PriceSample(buy)),
        (false, true) => Some(PriceSample(sell)),
        (false, false) => None,
    }
}

fn usable(price: f64) -> bool {
    price.is_finite() && price > 0.0 && price <= 1.0
}

async fn quote_or_zero<Q: QuoteSource>(quotes: &Q, token_id: &str, side: Side) -> f64 {
    match quotes.quote(token_id, side).await {
        Ok(price) => price,
        Err(e) => {
            let short = token_id.get(..12).unwrap_or(token_id);
            warn!(token = %short, side = side.as_str(), "Quote fetch failed: {e}");
            0.0
        }
    }
}
