// src/market/demo.rs
//! Synthetic quote feed. Each symbol starts from a fixed reference price and
//! takes a bounded random step on every fetch.

use crate::market::traits::QuoteSource;
use crate::types::Quote;
use crate::utils::indicators::NEUTRAL_RSI;
use crate::utils::precision::round_cents;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

/// Reference prices in cents.
const BASE_PRICES: [(&str, i64); 8] = [
    ("AAPL", 22752),
    ("GOOGL", 17584),
    ("MSFT", 42417),
    ("AMZN", 18629),
    ("TSLA", 24850),
    ("NVDA", 87530),
    ("META", 56392),
    ("NFLX", 69725),
];

const DEFAULT_PRICE_CENTS: i64 = 10000;
const MAX_STEP_CENTS: i64 = 500;

pub fn base_price(symbol: &str) -> Decimal {
    let cents = BASE_PRICES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, c)| *c)
        .unwrap_or(DEFAULT_PRICE_CENTS);
    Decimal::new(cents, 2)
}

/// Stand-in quote stored when a source cannot deliver one.
pub fn placeholder_quote(symbol: &str) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        price: base_price(symbol),
        change: Decimal::ZERO,
        change_pct: Decimal::ZERO,
        volume: 0,
        rsi: NEUTRAL_RSI,
        timestamp: Utc::now(),
    }
}

#[derive(Debug, Default)]
pub struct DemoQuoteSource {
    last: Mutex<HashMap<String, Decimal>>,
}

impl DemoQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuoteSource for DemoQuoteSource {
    fn name(&self) -> String {
        "demo".to_string()
    }

    async fn fetch(&self, symbol: &str) -> Result<Quote> {
        let (step_cents, volume) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(-MAX_STEP_CENTS..=MAX_STEP_CENTS),
                rng.gen_range(1_000_000..=50_000_000u64),
            )
        };

        let mut last = self
            .last
            .lock()
            .map_err(|_| anyhow!("demo price table lock poisoned"))?;
        let previous = *last
            .entry(symbol.to_string())
            .or_insert_with(|| base_price(symbol));

        let floor = Decimal::new(1, 2);
        let price = (previous + Decimal::new(step_cents, 2)).max(floor);
        let change = price - previous;
        let change_pct = round_cents(change / previous * Decimal::ONE_HUNDRED);
        last.insert(symbol.to_string(), price);

        Ok(Quote {
            symbol: symbol.to_string(),
            price,
            change,
            change_pct,
            volume,
            rsi: NEUTRAL_RSI,
            timestamp: Utc::now(),
        })
    }
}
