use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};

use crate::detector::evaluate;
use crate::error::Result;
use crate::feed::ReferenceFeed;
use crate::notifier::{self, Notifier};
use crate::resolver::{event_url, render_slug, resolve, Catalog};
use crate::sampler::{sample, QuoteSource};
use crate::state::AlertStore;
use crate::types::{AlertKind, Asset, ReferenceDelta};

/// Why an asset was left alone this cycle. None of these touch stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither side of the YES token's book quoted a positive price.
    NoYesPrice,
    /// The reference feed could not be reached or parsed.
    FeedUnavailable,
    /// The reference feed has no session open to measure change against.
    NoSessionOpen,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::NoYesPrice => "no YES price available",
            SkipReason::FeedUnavailable => "reference price unavailable",
            SkipReason::NoSessionOpen => "no session open price",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    Evaluated {
        fired: Vec<AlertKind>,
        delivery_failures: usize,
    },
    Skipped(SkipReason),
}

/// Totals for one pass over every configured asset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub evaluated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub alerts_fired: usize,
    pub delivery_failures: usize,
}

/// Runs resolve → sample → reference feed → evaluate → notify → persist for
/// each asset in configuration order. One asset is finished before the next
/// starts, and a failure on one never stops the rest.
pub struct Monitor<C, Q, F, N> {
    catalog: C,
    quotes: Q,
    feed: F,
    notifier: N,
    store: AlertStore,
    assets: Vec<Asset>,
}

impl<C, Q, F, N> Monitor<C, Q, F, N>
where
    C: Catalog,
    Q: QuoteSource,
    F: ReferenceFeed,
    N: Notifier,
{
    pub fn new(
        catalog: C,
        quotes: Q,
        feed: F,
        notifier: N,
        store: AlertStore,
        assets: Vec<Asset>,
    ) -> Self {
        Self { catalog, quotes, feed, notifier, store, assets }
    }

    pub async fn run_cycle(&self, today: NaiveDate) -> CycleReport {
        let mut report = CycleReport::default();

        for asset in &self.assets {
            match self.process_asset(asset, today).await {
                Ok(AssetOutcome::Evaluated { fired, delivery_failures }) => {
                    report.evaluated += 1;
                    report.alerts_fired += fired.len();
                    report.delivery_failures += delivery_failures;
                }
                Ok(AssetOutcome::Skipped(reason)) => {
                    warn!(asset = %asset.name, "Skipping {}: {reason}", asset.name);
                    report.skipped += 1;
                }
                Err(e) => {
                    error!(asset = %asset.name, "Error processing {}: {e}", asset.name);
                    report.failed += 1;
                }
            }
        }

        info!(
            evaluated = report.evaluated,
            skipped = report.skipped,
            failed = report.failed,
            alerts = report.alerts_fired,
            "Cycle complete: {} evaluated, {} skipped, {} failed, {} alerts fired",
            report.evaluated,
            report.skipped,
            report.failed,
            report.alerts_fired,
        );
        report
    }

    pub async fn process_asset(&self, asset: &Asset, today: NaiveDate) -> Result<AssetOutcome> {
        let name = asset.name.as_str();
        let slug = render_slug(&asset.slug_template, today);
        info!(asset = %name, slug = %slug, "--- Checking {name} for {today} ---");

        let market = resolve(&self.catalog, &event_url(&slug)).await?;
        info!(
            asset = %name,
            market_id = %market.market_id,
            yes_token = %market.tokens.yes,
            "Market {}: {}",
            market.event_slug,
            market.question,
        );

        let Some(yes) = sample(&self.quotes, &market.tokens.yes).await else {
            return Ok(AssetOutcome::Skipped(SkipReason::NoYesPrice));
        };
        let yes_price = yes.value();
        info!(asset = %name, yes_price, "YES price: {yes_price:.4}");

        let Some(quote) = self.feed.fetch(&asset.reference_symbol).await else {
            return Ok(AssetOutcome::Skipped(SkipReason::FeedUnavailable));
        };
        let Some(delta) = ReferenceDelta::from_quote(&quote) else {
            info!(asset = %name, current = quote.current_price, "Current price: {:.2}", quote.current_price);
            return Ok(AssetOutcome::Skipped(SkipReason::NoSessionOpen));
        };
        info!(
            asset = %name,
            open = delta.open,
            current = delta.current,
            percent_change = delta.percent_change,
            "Open: {:.2} | Current: {:.2} | Day's change: {:+.2} ({:+.2}%)",
            delta.open,
            delta.current,
            delta.change(),
            delta.percent_change,
        );

        let prior = self.store.load(name)?;
        let evaluation = evaluate(name, yes_price, delta.percent_change, prior, Local::now());

        // Delivery failures are logged and counted; the latch update below still
        // happens so a failed alert is not re-sent every cycle.
        let mut delivery_failures = 0;
        for n in &evaluation.fired {
            let subject = notifier::subject(n);
            warn!(asset = %name, kind = %n.kind, yes_price, "{subject}");
            match self.notifier.send(&subject, &notifier::body(n)).await {
                Ok(()) => info!(asset = %name, kind = %n.kind, "Notification for {name} sent"),
                Err(e) => {
                    error!(asset = %name, kind = %n.kind, "Failed to send notification for {name}: {e}");
                    delivery_failures += 1;
                }
            }
        }

        self.store.save(name, evaluation.next)?;

        if evaluation.fired.is_empty() {
            info!(
                asset = %name,
                high_latched = evaluation.next.last_high_alert,
                low_latched = evaluation.next.last_low_alert,
                "No alerts needed for {name}. Price: {yes_price:.2}, change: {:.2}%",
                delta.percent_change,
            );
        }

        Ok(AssetOutcome::Evaluated {
            fired: evaluation.kinds(),
            delivery_failures,
        })
    }
}
