//! Two-sided Schmitt trigger on the YES price.
//!
//! Each side has a latch. A side fires once when the price crosses its trigger
//! and cannot fire again until the price has come back through the release
//! level on the far side of a dead zone:
//!
//! ```text
//!   high side:  > 0.80 arms (high_alert)     <= 0.60 releases (falling_alert)
//!   low side:   < 0.20 arms (low_alert)      >= 0.40 releases (rising_alert)
//! ```
//!
//! The sides are independent. Nothing here assumes they are mutually exclusive.

use chrono::{DateTime, Local};

use crate::config::alert_thresholds::{HIGH_RELEASE, HIGH_TRIGGER, LOW_RELEASE, LOW_TRIGGER};
use crate::types::{AlertKind, AlertState, Notification};

/// Result of one evaluation: notifications in firing order and the state to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub fired: Vec<Notification>,
    pub next: AlertState,
}

impl Evaluation {
    pub fn kinds(&self) -> Vec<AlertKind> {
        self.fired.iter().map(|n| n.kind).collect()
    }
}

/// Evaluate one observation against the prior latches. Pure: the caller
/// persists `next` exactly once, whether or not anything fired.
pub fn evaluate(
    asset: &str,
    yes_price: f64,
    percent_change: f64,
    prior: AlertState,
    at: DateTime<Local>,
) -> Evaluation {
    let mut next = prior;

    let kinds = [
        high_side(yes_price, &mut next.last_high_alert),
        low_side(yes_price, &mut next.last_low_alert),
    ];
    let fired = kinds
        .into_iter()
        .flatten()
        .map(|kind| Notification {
            asset: asset.to_string(),
            kind,
            yes_price,
            percent_change,
            timestamp: at,
        })
        .collect();

    next.last_price = Some(yes_price);
    Evaluation { fired, next }
}

fn high_side(price: f64, latch: &mut bool) -> Option<AlertKind> {
    if price > HIGH_TRIGGER && !*latch {
        *latch = true;
        Some(AlertKind::HighAlert)
    } else if *latch && price <= HIGH_RELEASE {
        *latch = false;
        Some(AlertKind::FallingAlert)
    } else {
        None
    }
}

fn low_side(price: f64, latch: &mut bool) -> Option<AlertKind> {
    if price < LOW_TRIGGER && !*latch {
        *latch = true;
        Some(AlertKind::LowAlert)
    } else if *latch && price >= LOW_RELEASE {
        *latch = false;
        Some(AlertKind::RisingAlert)
    } else {
        None
    }
}
