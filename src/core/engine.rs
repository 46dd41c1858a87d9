// src/core/engine.rs
use crate::core::ledger::Order;
use crate::core::portfolio::SharedLedger;
use crate::market::cache::QuoteCache;
use crate::strategies::traits::Advisor;
use crate::tui::UiFeed;
use crate::types::{Recommendation, UiEvent};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Latest advisor output, shared with the HTTP layer.
pub type LatestAnalysis = Arc<RwLock<Option<Recommendation>>>;

/// Periodically asks an [`Advisor`] for a trade and executes it against the
/// automated book.
pub struct AutoTrader {
    advisor: Box<dyn Advisor>,
    quotes: Arc<QuoteCache>,
    ledger: SharedLedger,
    latest: LatestAnalysis,
    ui: UiFeed,
}

impl AutoTrader {
    pub fn new(
        advisor: Box<dyn Advisor>,
        quotes: Arc<QuoteCache>,
        ledger: SharedLedger,
        latest: LatestAnalysis,
        ui: UiFeed,
    ) -> Self {
        Self {
            advisor,
            quotes,
            ledger,
            latest,
            ui,
        }
    }

    /// One analysis round. A rejected trade is logged, not returned as an error.
    pub async fn step(&self) -> Result<Recommendation> {
        let quotes = self.quotes.quotes().await;
        let positions = self.ledger.positions().await;
        let rec = self.advisor.analyze(&quotes, &positions).await?;

        info!(
            "🤖 {} says {:?} {:?} x{} ({:.0}%): {}",
            rec.provider,
            rec.action,
            rec.symbol,
            rec.quantity,
            rec.confidence * 100.0,
            rec.reasoning
        );
        *self.latest.write().await = Some(rec.clone());
        self.ui.send(UiEvent::Recommendation(rec.clone()));

        if let Some((side, symbol, quantity)) = rec.order() {
            match self.quotes.get(symbol).await {
                Some(quote) => {
                    let order = Order::automated(
                        side,
                        symbol,
                        quantity,
                        quote.price,
                        rec.reasoning.clone(),
                    );
                    if let Err(e) = self.ledger.submit(order).await {
                        self.ui.send(UiEvent::Log(format!("Bot trade rejected: {}", e)));
                    }
                }
                None => {
                    warn!("No quote for {}; skipping automated {}", symbol, side);
                }
            }
        }

        Ok(rec)
    }

    pub fn spawn(self, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Automated trader running with {} every {:?}",
                self.advisor.name(),
                every
            );
            // First round waits one period so the cache has been filled.
            let start = tokio::time::Instant::now() + every;
            let mut ticker = tokio::time::interval_at(start, every);
            loop {
                ticker.tick().await;
                if let Err(e) = self.step().await {
                    error!("Analysis failed: {:#}", e);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::Ledger;
    use crate::market::demo::placeholder_quote;
    use crate::strategies::heuristic::HeuristicAdvisor;
    use crate::types::{Signal, TradeOrigin};
    use rust_decimal::Decimal;

    async fn setup(change_pct: i64) -> (AutoTrader, SharedLedger, LatestAnalysis) {
        let cache = Arc::new(QuoteCache::new(14));
        let mut quote = placeholder_quote("GOOGL");
        quote.price = Decimal::from(200);
        quote.change_pct = Decimal::from(change_pct);
        cache.replace(vec![quote]).await;

        let ledger = SharedLedger::new(
            "bot",
            Ledger::new(Decimal::from(50_000)).unwrap(),
            cache.clone(),
            UiFeed::disabled(),
        );
        let latest: LatestAnalysis = Arc::default();
        let trader = AutoTrader::new(
            Box::new(HeuristicAdvisor::new(Decimal::from(1000))),
            cache,
            ledger.clone(),
            latest.clone(),
            UiFeed::disabled(),
        );
        (trader, ledger, latest)
    }

    #[tokio::test]
    async fn buy_recommendation_fills_on_bot_book() {
        let (trader, ledger, latest) = setup(2).await;

        let rec = trader.step().await.unwrap();
        assert_eq!(rec.action, Signal::Buy);

        let snap = ledger.snapshot().await;
        assert_eq!(snap.positions.get("GOOGL"), Some(&5));
        assert_eq!(snap.cash, Decimal::from(49_000));
        let trade = &snap.trades[0];
        assert_eq!(trade.origin, TradeOrigin::Automated);
        assert_eq!(trade.reasoning.as_deref(), Some(rec.reasoning.as_str()));
        assert_eq!(latest.read().await.as_ref(), Some(&rec));
    }

    #[tokio::test]
    async fn hold_leaves_the_book_alone() {
        let (trader, ledger, latest) = setup(-2).await;

        let rec = trader.step().await.unwrap();
        assert_eq!(rec.action, Signal::Hold);
        assert!(ledger.snapshot().await.trades.is_empty());
        assert!(latest.read().await.is_some());
    }
}
