use crate::error::{AppError, Result};
use crate::types::Asset;

pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";
pub const CLOB_API_URL: &str = "https://clob.polymarket.com";
pub const BINANCE_API_URL: &str = "https://api.binance.com";

/// Default location of the per-asset alert state file.
pub const STATE_PATH: &str = "alert_state.json";

/// STARTTLS relay used when `SMTP_HOST` is not set.
pub const SMTP_HOST: &str = "smtp.gmail.com";

/// Timeout applied to every outbound HTTP request (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Hysteresis bands on the YES price. Fixed policy.
pub mod alert_thresholds {
    /// Above this, a high alert fires (once).
    pub const HIGH_TRIGGER: f64 = 0.80;
    /// At or below this, an armed high latch releases with a falling alert.
    pub const HIGH_RELEASE: f64 = 0.60;
    /// Below this, a low alert fires (once).
    pub const LOW_TRIGGER: f64 = 0.20;
    /// At or above this, an armed low latch releases with a rising alert.
    pub const LOW_RELEASE: f64 = 0.40;
}

/// Assets watched when `ALERT_ASSETS` is not set: `(name, slug template, symbol)`.
pub const DEFAULT_ASSETS: &[(&str, &str, &str)] = &[
    ("ETH", "ethereum-up-or-down-on-{month}-{day}", "ETHUSDT"),
    ("BTC", "bitcoin-up-or-down-on-{month}-{day}", "BTCUSDT"),
    ("XRP", "xrp-up-or-down-on-{month}-{day}", "XRPUSDT"),
    ("SOL", "solana-up-or-down-on-{month}-{day}", "SOLUSDT"),
];

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub from: Option<String>,
    pub app_password: Option<String>,
    /// Falls back to `from` when unset.
    pub to: Option<String>,
    pub smtp_host: String,
}

impl EmailConfig {
    /// True when enough credentials are present to attempt SMTP delivery.
    pub fn has_credentials(&self) -> bool {
        self.from.is_some() && self.app_password.is_some()
    }

    pub fn recipient(&self) -> Option<&str> {
        self.to.as_deref().or(self.from.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub gamma_api_url: String,
    pub clob_api_url: String,
    pub binance_api_url: String,
    pub state_path: String,
    /// Watched assets in evaluation order (ALERT_ASSETS, `NAME:template:SYMBOL`, comma-separated)
    pub assets: Vec<Asset>,
    pub email: EmailConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let assets = match get("ALERT_ASSETS") {
            Some(raw) => parse_assets(&raw)?,
            None => default_assets(),
        };

        Ok(Self {
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            gamma_api_url: get("GAMMA_API_URL").unwrap_or_else(|| GAMMA_API_URL.to_string()),
            clob_api_url: get("CLOB_API_URL").unwrap_or_else(|| CLOB_API_URL.to_string()),
            binance_api_url: get("BINANCE_API_URL")
                .unwrap_or_else(|| BINANCE_API_URL.to_string()),
            state_path: get("STATE_PATH").unwrap_or_else(|| STATE_PATH.to_string()),
            assets,
            email: EmailConfig {
                from: get("EMAIL_FROM"),
                app_password: get("EMAIL_APP_PASSWORD"),
                to: get("EMAIL_TO"),
                smtp_host: get("SMTP_HOST").unwrap_or_else(|| SMTP_HOST.to_string()),
            },
        })
    }
}

pub fn default_assets() -> Vec<Asset> {
    DEFAULT_ASSETS
        .iter()
        .map(|(name, template, symbol)| Asset::new(name, template, symbol))
        .collect()
}

/// Parse `ETH:ethereum-up-or-down-on-{month}-{day}:ETHUSDT,BTC:...`.
pub fn parse_assets(raw: &str) -> Result<Vec<Asset>> {
    let mut assets = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
        let [name, template, symbol] = parts.as_slice() else {
            return Err(AppError::Config(format!(
                "ALERT_ASSETS entry '{entry}' must be NAME:slug_template:SYMBOL"
            )));
        };
        if name.is_empty() || template.is_empty() || symbol.is_empty() {
            return Err(AppError::Config(format!(
                "ALERT_ASSETS entry '{entry}' has an empty field"
            )));
        }
        if !template.contains("{day}") {
            return Err(AppError::Config(format!(
                "slug template for {name} must contain {{day}}"
            )));
        }
        if assets.iter().any(|a: &Asset| a.name == *name) {
            return Err(AppError::Config(format!("asset {name} listed twice")));
        }
        assets.push(Asset::new(name, template, symbol));
    }

    if assets.is_empty() {
        return Err(AppError::Config("ALERT_ASSETS lists no assets".to_string()));
    }
    Ok(assets)
}
