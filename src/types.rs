use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// One watched asset. Fixed at configuration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Display and state-store key, e.g. "ETH".
    pub name: String,
    /// Event slug with `{month}` / `{day}` placeholders, rendered once per run.
    pub slug_template: String,
    /// Spot-exchange symbol used for the reference feed, e.g. "ETHUSDT".
    pub reference_symbol: String,
}

impl Asset {
    pub fn new(name: &str, slug_template: &str, reference_symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            slug_template: slug_template.to_string(),
            reference_symbol: reference_symbol.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// The two outcome token ids of a binary market, in catalog order.
/// The first one is the YES token by convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub yes: String,
    pub no: String,
}

/// A market located for today's event. Built fresh every poll, never persisted.
#[derive(Debug, Clone)]
pub struct ResolvedMarket {
    pub event_slug: String,
    pub market_id: String,
    pub question: String,
    pub tokens: TokenPair,
    /// Market payload as the catalog returned it.
    pub raw: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// Probability-like YES price in [0, 1]. Not a currency amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample(pub f64);

impl PriceSample {
    pub fn value(self) -> f64 {
        self.0
    }
}

/// What the reference feed reports for a symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceQuote {
    /// `None` when the exchange has no session-open data yet.
    pub open_price: Option<f64>,
    pub current_price: f64,
}

/// Movement of the reference asset since the session open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceDelta {
    pub open: f64,
    pub current: f64,
    pub percent_change: f64,
}

impl ReferenceDelta {
    /// Returns None when there is no usable open price to measure against.
    pub fn from_quote(quote: &ReferenceQuote) -> Option<Self> {
        let open = quote.open_price.filter(|o| o.is_finite() && *o != 0.0)?;
        let current = quote.current_price;
        Some(Self {
            open,
            current,
            percent_change: (current - open) / open * 100.0,
        })
    }

    pub fn change(&self) -> f64 {
        self.current - self.open
    }
}

// ---------------------------------------------------------------------------
// Alert state
// ---------------------------------------------------------------------------

/// Per-asset hysteresis latches, persisted between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertState {
    pub last_high_alert: bool,
    pub last_low_alert: bool,
    pub last_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// YES price rose above the high threshold.
    HighAlert,
    /// YES price fell back through the high release level.
    FallingAlert,
    /// YES price dropped below the low threshold.
    LowAlert,
    /// YES price climbed back through the low release level.
    RisingAlert,
}

impl AlertKind {
    /// One-line description used as the mail subject and body heading.
    pub fn headline(self, asset: &str) -> String {
        match self {
            AlertKind::HighAlert => format!("🚨 HIGH ALERT: {asset} Price above 80%"),
            AlertKind::FallingAlert => {
                format!("📉 FALLING ALERT: {asset} Price dropped to 60% or below")
            }
            AlertKind::LowAlert => format!("🚨 LOW ALERT: {asset} Price below 20%"),
            AlertKind::RisingAlert => {
                format!("📈 RISING ALERT: {asset} Price climbed to 40% or above")
            }
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertKind::HighAlert => "high_alert",
            AlertKind::FallingAlert => "falling_alert",
            AlertKind::LowAlert => "low_alert",
            AlertKind::RisingAlert => "rising_alert",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// A fired alert, produced and delivered within one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub asset: String,
    pub kind: AlertKind,
    pub yes_price: f64,
    pub percent_change: f64,
    pub timestamp: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_computes_percent_change() {
        let delta = ReferenceDelta::from_quote(&ReferenceQuote {
            open_price: Some(2000.0),
            current_price: 2050.0,
        })
        .unwrap();
        assert!((delta.percent_change - 2.5).abs() < 1e-9);
        assert!((delta.change() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn delta_requires_open_price() {
        let missing = ReferenceQuote { open_price: None, current_price: 10.0 };
        let zero = ReferenceQuote { open_price: Some(0.0), current_price: 10.0 };
        assert!(ReferenceDelta::from_quote(&missing).is_none());
        assert!(ReferenceDelta::from_quote(&zero).is_none());
    }

    #[test]
    fn alert_state_serializes_absent_price_as_null() {
        let json = serde_json::to_value(AlertState::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "last_high_alert": false,
                "last_low_alert": false,
                "last_price": null
            })
        );
    }

    #[test]
    fn alert_kind_display_matches_wire_names() {
        assert_eq!(AlertKind::FallingAlert.to_string(), "falling_alert");
        assert_eq!(
            serde_json::to_value(AlertKind::RisingAlert).unwrap(),
            serde_json::json!("rising_alert")
        );
    }
}
