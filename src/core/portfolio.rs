// src/core/portfolio.rs
use crate::core::ledger::{Ledger, LedgerError, Order, PortfolioSnapshot, TradeConfirmation};
use crate::market::cache::QuoteCache;
use crate::tui::UiFeed;
use crate::types::{Side, UiEvent};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Cloneable handle to one ledger instance.
///
/// Every mutation runs under the ledger's mutex together with the revaluation
/// that follows it, so readers never see cash moved without the position.
/// Quote prices are read once the mutex is held, so a trade never re-marks
/// the book with prices older than the last refresh. Lock order is ledger,
/// then cache; nothing takes them the other way round.
#[derive(Clone)]
pub struct SharedLedger {
    book: Arc<str>,
    inner: Arc<Mutex<Ledger>>,
    quotes: Arc<QuoteCache>,
    ui: UiFeed,
}

impl SharedLedger {
    pub fn new(book: &str, ledger: Ledger, quotes: Arc<QuoteCache>, ui: UiFeed) -> Self {
        Self {
            book: Arc::from(book),
            inner: Arc::new(Mutex::new(ledger)),
            quotes,
            ui,
        }
    }

    pub fn book(&self) -> &str {
        &self.book
    }

    pub async fn execute_trade(
        &self,
        action: Side,
        symbol: &str,
        quantity: u64,
        unit_price: Decimal,
    ) -> Result<TradeConfirmation, LedgerError> {
        self.submit(Order::manual(action, symbol, quantity, unit_price))
            .await
    }

    pub async fn submit(&self, order: Order) -> Result<TradeConfirmation, LedgerError> {
        let (result, snapshot) = {
            let mut ledger = self.inner.lock().await;
            let result = ledger.submit(order.clone());
            if result.is_ok() {
                let prices = self.quotes.prices().await;
                ledger.revalue(&prices);
            }
            (result, ledger.snapshot())
        };

        match &result {
            Ok(confirmation) => {
                info!(
                    book = %self.book,
                    origin = ?confirmation.trade.origin,
                    "{} @ {} (total {}), cash now {}",
                    confirmation.message,
                    confirmation.trade.price,
                    confirmation.trade.total,
                    snapshot.cash
                );
                self.ui.send(UiEvent::Trade(confirmation.trade.clone()));
                self.ui.send(UiEvent::Portfolio {
                    book: self.book.to_string(),
                    snapshot,
                });
            }
            Err(e) => {
                warn!(
                    book = %self.book,
                    "Rejected {} {} x{} @ {}: {}",
                    order.action, order.symbol, order.quantity, order.unit_price, e
                );
            }
        }
        result
    }

    /// Re-marks the ledger against the current quote cache.
    pub async fn revalue(&self) -> Decimal {
        let (total, snapshot) = {
            let mut ledger = self.inner.lock().await;
            let prices = self.quotes.prices().await;
            let total = ledger.revalue(&prices);
            (total, ledger.snapshot())
        };
        self.ui.send(UiEvent::Portfolio {
            book: self.book.to_string(),
            snapshot,
        });
        total
    }

    pub async fn snapshot(&self) -> PortfolioSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn positions(&self) -> BTreeMap<String, u64> {
        self.inner.lock().await.positions().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::demo::placeholder_quote;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn shared(cash: &str, cache: Arc<QuoteCache>) -> SharedLedger {
        SharedLedger::new(
            "human",
            Ledger::new(dec(cash)).unwrap(),
            cache,
            UiFeed::disabled(),
        )
    }

    #[tokio::test]
    async fn trade_is_revalued_against_the_cache() {
        let cache = Arc::new(QuoteCache::new(14));
        let mut quote = placeholder_quote("AAPL");
        quote.price = dec("230.00");
        cache.replace(vec![quote]).await;

        let ledger = shared("100000", cache);
        ledger
            .execute_trade(Side::Buy, "AAPL", 10, dec("227.52"))
            .await
            .unwrap();

        let snap = ledger.snapshot().await;
        assert_eq!(snap.cash, dec("97724.80"));
        assert_eq!(snap.total_value, dec("100024.80"));
    }

    #[tokio::test]
    async fn revalue_follows_cache_refreshes() {
        let cache = Arc::new(QuoteCache::new(14));
        let ledger = shared("1000", cache.clone());
        ledger
            .execute_trade(Side::Buy, "TSLA", 2, dec("100"))
            .await
            .unwrap();
        // No quote yet: the position is marked at zero.
        assert_eq!(ledger.snapshot().await.total_value, dec("800"));

        let mut quote = placeholder_quote("TSLA");
        quote.price = dec("150");
        cache.replace(vec![quote]).await;
        assert_eq!(ledger.revalue().await, dec("1100"));
        assert_eq!(ledger.snapshot().await.pnl, dec("100"));
    }

    #[tokio::test]
    async fn trade_waiting_on_the_lock_marks_with_the_latest_refresh() {
        let cache = Arc::new(QuoteCache::new(14));
        let mut quote = placeholder_quote("AAPL");
        quote.price = dec("200");
        cache.replace(vec![quote.clone()]).await;
        let ledger = shared("10000", cache.clone());

        let guard = ledger.inner.lock().await;
        let pending = {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger.execute_trade(Side::Buy, "AAPL", 10, dec("200")).await
            })
        };
        // Let the trade reach the mutex before the refresh lands.
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        quote.price = dec("250");
        cache.replace(vec![quote]).await;
        drop(guard);

        pending.await.unwrap().unwrap();
        // 8000 cash + 10 * 250
        assert_eq!(ledger.snapshot().await.total_value, dec("10500"));
    }

    #[tokio::test]
    async fn concurrent_buys_never_overdraw() {
        let cache = Arc::new(QuoteCache::new(14));
        let ledger = shared("1000", cache);

        let mut handles = Vec::new();
        for _ in 0..20 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.execute_trade(Side::Buy, "META", 1, dec("100")).await
            }));
        }
        let mut filled = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                filled += 1;
            }
        }

        let snap = ledger.snapshot().await;
        assert_eq!(filled, 10);
        assert_eq!(snap.cash, Decimal::ZERO);
        assert_eq!(snap.positions.get("META"), Some(&10));
        assert_eq!(snap.trades.len(), 10);
    }
}
