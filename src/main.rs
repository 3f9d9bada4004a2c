mod config;
mod detector;
mod error;
mod feed;
mod fetcher;
mod monitor;
mod notifier;
mod resolver;
mod sampler;
mod state;
mod types;

use chrono::Local;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;
use crate::feed::BinanceFeed;
use crate::fetcher::{ClobClient, GammaClient};
use crate::monitor::Monitor;
use crate::notifier::EmailNotifier;
use crate::state::AlertStore;

/// One polling pass per invocation; scheduling is left to cron or a timer unit.
/// Per-asset failures are logged and never change the exit code.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let notifier = EmailNotifier::from_config(&cfg.email);
    match &notifier {
        EmailNotifier::MissingCredentials => {
            warn!("EMAIL_FROM / EMAIL_APP_PASSWORD not set, alerts will be logged but not mailed")
        }
        EmailNotifier::Misconfigured(reason) => {
            error!("Email settings unusable, alerts will not be mailed: {reason}")
        }
        EmailNotifier::Smtp(_) => {}
    }

    let store = AlertStore::new(&cfg.state_path);
    info!(
        assets = cfg.assets.len(),
        state = %store.path().display(),
        "Starting alert check for {}",
        cfg.assets
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    );

    let monitor = Monitor::new(
        GammaClient::new(&cfg.gamma_api_url)?,
        ClobClient::new(&cfg.clob_api_url)?,
        BinanceFeed::new(&cfg.binance_api_url)?,
        notifier,
        store,
        cfg.assets.clone(),
    );

    monitor.run_cycle(Local::now().date_naive()).await;
    Ok(())
}
