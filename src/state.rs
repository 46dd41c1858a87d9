//! Shared runtime state.
//!
//! Built once at startup and handed to the HTTP handlers and background tasks
//! as `Arc<AppState>`.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::engine::LatestAnalysis;
use crate::core::ledger::{Ledger, LedgerError};
use crate::core::portfolio::SharedLedger;
use crate::market::cache::QuoteCache;
use crate::tui::UiFeed;

/// Static facts reported by `GET /api/status`.
#[derive(Clone, Debug)]
pub struct ServiceInfo {
    pub data_source: String,
    pub update_interval_secs: u64,
    pub symbols_tracked: usize,
    pub bot_enabled: bool,
}

pub struct AppState {
    pub quotes: Arc<QuoteCache>,
    /// Book driven by user trade requests.
    pub human: SharedLedger,
    /// Book driven by the automated trader.
    pub bot: SharedLedger,
    pub analysis: LatestAnalysis,
    pub info: ServiceInfo,
}

impl AppState {
    pub fn new(cfg: &AppConfig, data_source: String, ui: UiFeed) -> Result<Self, LedgerError> {
        let quotes = Arc::new(QuoteCache::new(cfg.market.rsi_period));
        let human = SharedLedger::new(
            "human",
            Ledger::new(cfg.portfolio.human_initial_cash)?,
            quotes.clone(),
            ui.clone(),
        );
        let bot = SharedLedger::new(
            "bot",
            Ledger::new(cfg.portfolio.bot_initial_cash)?,
            quotes.clone(),
            ui,
        );

        Ok(Self {
            quotes,
            human,
            bot,
            analysis: LatestAnalysis::default(),
            info: ServiceInfo {
                data_source,
                update_interval_secs: cfg.market.refresh_secs,
                symbols_tracked: cfg.market.symbols.len(),
                bot_enabled: cfg.bot.enabled,
            },
        })
    }
}
