// src/config.rs

use crate::strategies::remote::AiProvider;
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

pub const DEFAULT_SYMBOLS: [&str; 8] = [
    "AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "NVDA", "META", "NFLX",
];

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MarketConfig {
    pub symbols: Vec<String>,
    pub refresh_secs: u64,
    pub rsi_period: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PortfolioConfig {
    pub human_initial_cash: Decimal,
    pub bot_initial_cash: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    pub enabled: bool,
    pub provider: AiProvider,
    pub api_key: Option<String>,
    pub interval_secs: u64,
    // Cash committed per automated buy
    pub order_budget: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub dashboard: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub market: MarketConfig,
    pub portfolio: PortfolioConfig,
    pub bot: BotConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load("Settings")
    }

    /// Defaults, then the optional settings file `name` (any format the
    /// `config` crate understands), then `APP__SECTION__KEY` variables.
    pub fn load(name: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("market.symbols", DEFAULT_SYMBOLS.to_vec())?
            .set_default("market.refresh_secs", 30)?
            .set_default("market.rsi_period", 14)?
            .set_default("portfolio.human_initial_cash", "100000")?
            .set_default("portfolio.bot_initial_cash", "50000")?
            .set_default("bot.enabled", true)?
            .set_default("bot.provider", "heuristic")?
            .set_default("bot.interval_secs", 60)?
            .set_default("bot.order_budget", "5000")?
            .set_default("ui.dashboard", false)?
            .set_default("log.level", "info")?
            .set_default("log.dir", "logs")?
            .add_source(File::with_name(name).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("market.symbols"),
            );

        let config = builder.build()?;
        let cfg: AppConfig = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::Message(
                "market.symbols must name at least one symbol".into(),
            ));
        }
        if self.market.refresh_secs == 0 {
            return Err(ConfigError::Message(
                "market.refresh_secs must be positive".into(),
            ));
        }
        if self.bot.interval_secs == 0 {
            return Err(ConfigError::Message(
                "bot.interval_secs must be positive".into(),
            ));
        }
        for (key, cash) in [
            ("portfolio.human_initial_cash", self.portfolio.human_initial_cash),
            ("portfolio.bot_initial_cash", self.portfolio.bot_initial_cash),
        ] {
            if cash.is_sign_negative() {
                return Err(ConfigError::Message(format!(
                    "{} must not be negative, got {}",
                    key, cash
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_settings_file() {
        let cfg = AppConfig::load("does-not-exist").unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.market.symbols.len(), DEFAULT_SYMBOLS.len());
        assert_eq!(cfg.market.refresh_secs, 30);
        assert_eq!(cfg.portfolio.human_initial_cash, Decimal::from(100_000));
        assert_eq!(cfg.portfolio.bot_initial_cash, Decimal::from(50_000));
        assert_eq!(cfg.bot.provider, AiProvider::Heuristic);
        assert!(cfg.bot.api_key.is_none());
        assert!(!cfg.ui.dashboard);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = AppConfig::load("does-not-exist").unwrap();
        cfg.market.refresh_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::load("does-not-exist").unwrap();
        cfg.portfolio.bot_initial_cash = Decimal::from(-1);
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::load("does-not-exist").unwrap();
        cfg.market.symbols = vec![];
        assert!(cfg.validate().is_err());
    }
}
