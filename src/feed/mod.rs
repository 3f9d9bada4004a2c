pub mod binance;

pub use binance::BinanceFeed;

use crate::types::ReferenceQuote;

/// Session-open and current price of the reference asset.
#[allow(async_fn_in_trait)]
pub trait ReferenceFeed {
    /// `None` on transport or parse failure. A quote with `open_price: None`
    /// means the exchange has no session-open data for today.
    async fn fetch(&self, symbol: &str) -> Option<ReferenceQuote>;
}
