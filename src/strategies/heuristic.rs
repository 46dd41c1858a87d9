use crate::strategies::traits::Advisor;
use crate::types::{Quote, Recommendation, Signal};
use crate::utils::precision::whole_shares;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const PROVIDER: &str = "heuristic";

/// Rule-based stand-in for model-driven analysis.
///
/// Rules, first match wins:
/// 1. A held symbol with RSI at or above `overbought` is sold in full.
/// 2. The most oversold symbol (RSI at or below `oversold`) is bought.
/// 3. Average change above zero: buy the best performer.
/// 4. Average change below zero: sell the worst performer among held symbols.
/// 5. Otherwise hold.
///
/// Buys are sized as the whole shares that `order_budget` affords.
pub struct HeuristicAdvisor {
    order_budget: Decimal,
    oversold: f64,
    overbought: f64,
}

impl HeuristicAdvisor {
    pub fn new(order_budget: Decimal) -> Self {
        Self {
            order_budget,
            oversold: 30.0,
            overbought: 70.0,
        }
    }

    pub fn recommend(&self, quotes: &[Quote], positions: &BTreeMap<String, u64>) -> Recommendation {
        if quotes.is_empty() {
            return Recommendation::hold(PROVIDER, "No market data available");
        }

        // 1. Take profit on overbought holdings
        if let Some(q) = quotes
            .iter()
            .filter(|q| q.rsi >= self.overbought && positions.contains_key(&q.symbol))
            .max_by(|a, b| a.rsi.total_cmp(&b.rsi))
        {
            let held = positions.get(&q.symbol).copied().unwrap_or(0);
            return advise(
                Signal::Sell,
                q,
                held,
                0.7,
                format!(
                    "{} RSI {:.1} is overbought; closing {} shares",
                    q.symbol, q.rsi, held
                ),
            );
        }

        // 2. Buy the dip
        if let Some(q) = quotes
            .iter()
            .filter(|q| q.rsi <= self.oversold)
            .min_by(|a, b| a.rsi.total_cmp(&b.rsi))
        {
            let qty = whole_shares(self.order_budget, q.price);
            if qty > 0 {
                return advise(
                    Signal::Buy,
                    q,
                    qty,
                    0.65,
                    format!("{} RSI {:.1} is oversold", q.symbol, q.rsi),
                );
            }
        }

        // 3./4. Follow the market trend
        let sentiment =
            quotes.iter().map(|q| q.change_pct).sum::<Decimal>() / Decimal::from(quotes.len());

        if sentiment > Decimal::ZERO {
            let Some(best) = quotes.iter().max_by_key(|q| q.change_pct) else {
                return Recommendation::hold(PROVIDER, "No market data available");
            };
            let qty = whole_shares(self.order_budget, best.price);
            if qty == 0 {
                return Recommendation::hold(
                    PROVIDER,
                    format!(
                        "Bullish market but one share of {} exceeds the order budget",
                        best.symbol
                    ),
                );
            }
            return advise(
                Signal::Buy,
                best,
                qty,
                0.6,
                format!(
                    "Bullish market (avg {:.2}%); {} leads at {:.2}%",
                    sentiment, best.symbol, best.change_pct
                ),
            );
        }

        if sentiment < Decimal::ZERO {
            let worst_held = quotes
                .iter()
                .filter(|q| positions.contains_key(&q.symbol))
                .min_by_key(|q| q.change_pct);
            return match worst_held {
                Some(worst) => {
                    let held = positions.get(&worst.symbol).copied().unwrap_or(0);
                    advise(
                        Signal::Sell,
                        worst,
                        held,
                        0.6,
                        format!(
                            "Bearish market (avg {:.2}%); cutting {} at {:.2}%",
                            sentiment, worst.symbol, worst.change_pct
                        ),
                    )
                }
                None => Recommendation::hold(
                    PROVIDER,
                    format!("Bearish market (avg {:.2}%) and nothing held", sentiment),
                ),
            };
        }

        Recommendation::hold(PROVIDER, "Market is flat")
    }
}

fn advise(
    action: Signal,
    quote: &Quote,
    quantity: u64,
    confidence: f64,
    reasoning: String,
) -> Recommendation {
    Recommendation {
        action,
        symbol: Some(quote.symbol.clone()),
        quantity,
        confidence,
        reasoning,
        provider: PROVIDER.to_string(),
        timestamp: Utc::now(),
    }
}

#[async_trait]
impl Advisor for HeuristicAdvisor {
    fn name(&self) -> String {
        PROVIDER.to_string()
    }

    async fn analyze(
        &self,
        quotes: &[Quote],
        positions: &BTreeMap<String, u64>,
    ) -> Result<Recommendation> {
        Ok(self.recommend(quotes, positions))
    }
}
