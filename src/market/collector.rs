// src/market/collector.rs
use crate::core::portfolio::SharedLedger;
use crate::market::cache::QuoteCache;
use crate::market::demo::placeholder_quote;
use crate::market::traits::QuoteSource;
use crate::tui::UiFeed;
use crate::types::{Quote, UiEvent};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Polls a [`QuoteSource`] for a fixed universe, refreshes the cache and
/// re-marks every registered ledger.
pub struct QuoteCollector {
    source: Arc<dyn QuoteSource>,
    cache: Arc<QuoteCache>,
    symbols: Vec<String>,
    ledgers: Vec<SharedLedger>,
    ui: UiFeed,
}

impl QuoteCollector {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        cache: Arc<QuoteCache>,
        symbols: Vec<String>,
        ledgers: Vec<SharedLedger>,
        ui: UiFeed,
    ) -> Self {
        Self {
            source,
            cache,
            symbols,
            ledgers,
            ui,
        }
    }

    /// One refresh cycle. Fetch failures are replaced by placeholder quotes.
    pub async fn refresh_once(&self) -> Vec<Quote> {
        info!(
            "Refreshing {} quotes from {}",
            self.symbols.len(),
            self.source.name()
        );

        let mut batch = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            let quote = match self.source.fetch(symbol).await {
                Ok(q) if q.price > Decimal::ZERO => q,
                Ok(q) => {
                    warn!(
                        "{}: non-positive price {} from source, using placeholder",
                        symbol, q.price
                    );
                    placeholder_quote(symbol)
                }
                Err(e) => {
                    warn!("{}: quote fetch failed ({:#}), using placeholder", symbol, e);
                    placeholder_quote(symbol)
                }
            };
            debug!("{}: ${} ({})", quote.symbol, quote.price, quote.change);
            batch.push(quote);
        }

        let stored = self.cache.replace(batch).await;
        for ledger in &self.ledgers {
            let total = ledger.revalue().await;
            debug!(book = ledger.book(), "Portfolio value {}", total);
        }

        self.ui.send(UiEvent::Quotes(stored.clone()));
        self.ui.send(UiEvent::Log(format!("Refreshed {} quotes", stored.len())));
        stored
    }

    /// Runs `refresh_once` every `every` for the life of the process.
    pub fn spawn(self, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                self.refresh_once().await;
            }
        })
    }
}
