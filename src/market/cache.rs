// src/market/cache.rs
use crate::types::Quote;
use crate::utils::indicators::rsi;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, VecDeque};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct CacheState {
    quotes: BTreeMap<String, Quote>,
    closes: HashMap<String, VecDeque<f64>>,
    last_update: Option<DateTime<Utc>>,
}

/// Latest quote per symbol, plus a short close history for RSI.
#[derive(Debug)]
pub struct QuoteCache {
    state: RwLock<CacheState>,
    rsi_period: usize,
    history_len: usize,
}

impl QuoteCache {
    pub fn new(rsi_period: usize) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            rsi_period,
            // Enough warm-up for the EMA inside the RSI to settle.
            history_len: (rsi_period * 4).max(32),
        }
    }

    pub async fn get(&self, symbol: &str) -> Option<Quote> {
        self.state.read().await.quotes.get(symbol).cloned()
    }

    pub async fn all(&self) -> BTreeMap<String, Quote> {
        self.state.read().await.quotes.clone()
    }

    pub async fn quotes(&self) -> Vec<Quote> {
        self.state.read().await.quotes.values().cloned().collect()
    }

    /// Symbol -> price view used for mark-to-market.
    pub async fn prices(&self) -> HashMap<String, Decimal> {
        self.state
            .read()
            .await
            .quotes
            .iter()
            .map(|(symbol, q)| (symbol.clone(), q.price))
            .collect()
    }

    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_update
    }

    /// Swaps in a full refresh cycle. Each quote's RSI is recomputed from the
    /// cached close history. Returns the quotes as stored.
    pub async fn replace(&self, batch: Vec<Quote>) -> Vec<Quote> {
        let mut state = self.state.write().await;
        let mut quotes = BTreeMap::new();

        for mut quote in batch {
            let history = state.closes.entry(quote.symbol.clone()).or_default();
            history.push_back(quote.price.to_f64().unwrap_or_default());
            while history.len() > self.history_len {
                history.pop_front();
            }
            quote.rsi = rsi(history.make_contiguous(), self.rsi_period);
            quotes.insert(quote.symbol.clone(), quote);
        }

        state.quotes = quotes;
        state.last_update = Some(Utc::now());
        state.quotes.values().cloned().collect()
    }
}
