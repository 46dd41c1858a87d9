// src/core/ledger.rs
//! Paper portfolio ledger: cash, open positions and an append-only trade log.
//!
//! Cash and positions are always the result of replaying the trade log from
//! the initial cash balance. `total_value` is derived from them plus the last
//! price marks handed to [`Ledger::revalue`]; it is never adjusted on its own.

use crate::types::{Side, TradeOrigin, TradeRecord};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Insufficient funds: trade needs {needed}, cash available {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    #[error("Insufficient shares of {symbol}: requested {requested}, held {held}")]
    InsufficientShares {
        symbol: String,
        requested: u64,
        held: u64,
    },
}

impl LedgerError {
    /// Stable machine-readable tag, used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidInput(_) => "invalid_input",
            LedgerError::InvalidAction(_) => "invalid_action",
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::InsufficientShares { .. } => "insufficient_shares",
        }
    }
}

/// Source of current prices for mark-to-market valuation.
///
/// A missing price is not an error: the position is valued at zero.
pub trait PriceLookup {
    fn price_of(&self, symbol: &str) -> Option<Decimal>;
}

impl PriceLookup for HashMap<String, Decimal> {
    fn price_of(&self, symbol: &str) -> Option<Decimal> {
        self.get(symbol).copied()
    }
}

impl PriceLookup for BTreeMap<String, Decimal> {
    fn price_of(&self, symbol: &str) -> Option<Decimal> {
        self.get(symbol).copied()
    }
}

/// A trade request after the wire-level fields have been typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub action: Side,
    pub symbol: String,
    pub quantity: u64,
    pub unit_price: Decimal,
    pub origin: TradeOrigin,
    pub reasoning: Option<String>,
}

impl Order {
    pub fn manual(
        action: Side,
        symbol: impl Into<String>,
        quantity: u64,
        unit_price: Decimal,
    ) -> Self {
        Self {
            action,
            symbol: symbol.into(),
            quantity,
            unit_price,
            origin: TradeOrigin::Manual,
            reasoning: None,
        }
    }

    pub fn automated(
        action: Side,
        symbol: impl Into<String>,
        quantity: u64,
        unit_price: Decimal,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            action,
            symbol: symbol.into(),
            quantity,
            unit_price,
            origin: TradeOrigin::Automated,
            reasoning: Some(reasoning.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeConfirmation {
    pub message: String,
    pub trade: TradeRecord,
}

/// Serializable read view of a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub initial_cash: Decimal,
    pub cash: Decimal,
    pub positions: BTreeMap<String, u64>,
    pub total_value: Decimal,
    pub pnl: Decimal,
    pub trades: Vec<TradeRecord>,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    initial_cash: Decimal,
    cash: Decimal,
    positions: BTreeMap<String, u64>,
    trades: Vec<TradeRecord>,
    marks: HashMap<String, Decimal>,
    total_value: Decimal,
}

impl Ledger {
    pub fn new(initial_cash: Decimal) -> Result<Self, LedgerError> {
        if initial_cash.is_sign_negative() {
            return Err(LedgerError::InvalidInput(format!(
                "initial cash must not be negative, got {}",
                initial_cash
            )));
        }
        Ok(Self {
            initial_cash,
            cash: initial_cash,
            positions: BTreeMap::new(),
            trades: Vec::new(),
            marks: HashMap::new(),
            total_value: initial_cash,
        })
    }

    /// Rebuilds a ledger by re-applying `trades` in order from `initial_cash`.
    pub fn replay(initial_cash: Decimal, trades: &[TradeRecord]) -> Result<Self, LedgerError> {
        let mut ledger = Self::new(initial_cash)?;
        for trade in trades {
            ledger.apply(trade.action, &trade.symbol, trade.quantity, trade.price)?;
            ledger.trades.push(trade.clone());
        }
        ledger.total_value = ledger.value(&ledger.marks);
        Ok(ledger)
    }

    pub fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn positions(&self) -> &BTreeMap<String, u64> {
        &self.positions
    }

    pub fn shares(&self, symbol: &str) -> u64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Last computed mark-to-market value.
    pub fn total_value(&self) -> Decimal {
        self.total_value
    }

    pub fn execute_trade(
        &mut self,
        action: Side,
        symbol: &str,
        quantity: u64,
        unit_price: Decimal,
    ) -> Result<TradeConfirmation, LedgerError> {
        self.submit(Order::manual(action, symbol, quantity, unit_price))
    }

    /// Executes an order all-or-nothing. On error the ledger is untouched.
    pub fn submit(&mut self, order: Order) -> Result<TradeConfirmation, LedgerError> {
        let total = self.apply(order.action, &order.symbol, order.quantity, order.unit_price)?;

        let trade = TradeRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            symbol: order.symbol,
            action: order.action,
            quantity: order.quantity,
            price: order.unit_price,
            total,
            reasoning: order.reasoning,
            origin: order.origin,
        };
        self.trades.push(trade.clone());
        self.total_value = self.value(&self.marks);

        let verb = match trade.action {
            Side::Buy => "Bought",
            Side::Sell => "Sold",
        };
        Ok(TradeConfirmation {
            message: format!("{} {} shares of {}", verb, trade.quantity, trade.symbol),
            trade,
        })
    }

    /// Cash plus every position marked at `prices`. Does not touch the ledger.
    pub fn value<L: PriceLookup + ?Sized>(&self, prices: &L) -> Decimal {
        self.positions
            .iter()
            .filter_map(|(symbol, shares)| {
                prices
                    .price_of(symbol)
                    .map(|price| Decimal::from(*shares) * price)
            })
            .fold(self.cash, |acc, market_value| acc + market_value)
    }

    /// Stores fresh marks for held symbols and recomputes `total_value`.
    pub fn revalue<L: PriceLookup + ?Sized>(&mut self, prices: &L) -> Decimal {
        self.marks = self
            .positions
            .keys()
            .filter_map(|symbol| prices.price_of(symbol).map(|p| (symbol.clone(), p)))
            .collect();
        self.total_value = self.value(prices);
        self.total_value
    }

    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            initial_cash: self.initial_cash,
            cash: self.cash,
            positions: self.positions.clone(),
            total_value: self.total_value,
            pnl: self.total_value - self.initial_cash,
            trades: self.trades.clone(),
        }
    }

    /// Validates and applies the cash/position effect of one fill.
    /// Returns the fill total.
    fn apply(
        &mut self,
        action: Side,
        symbol: &str,
        quantity: u64,
        unit_price: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidInput(
                "quantity must be a positive integer".into(),
            ));
        }
        if unit_price <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!(
                "price must be positive, got {}",
                unit_price
            )));
        }
        let total = Decimal::from(quantity)
            .checked_mul(unit_price)
            .ok_or_else(|| LedgerError::InvalidInput("trade total is out of range".into()))?;

        match action {
            Side::Buy => {
                if self.cash < total {
                    return Err(LedgerError::InsufficientFunds {
                        needed: total,
                        available: self.cash,
                    });
                }
                self.cash -= total;
                *self.positions.entry(symbol.to_string()).or_insert(0) += quantity;
            }
            Side::Sell => {
                let held = self.shares(symbol);
                if held < quantity {
                    return Err(LedgerError::InsufficientShares {
                        symbol: symbol.to_string(),
                        requested: quantity,
                        held,
                    });
                }
                self.cash += total;
                if held == quantity {
                    self.positions.remove(symbol);
                    self.marks.remove(symbol);
                } else {
                    self.positions.insert(symbol.to_string(), held - quantity);
                }
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scenario_a() -> Ledger {
        let mut ledger = Ledger::new(dec("100000")).unwrap();
        ledger
            .execute_trade(Side::Buy, "AAPL", 10, dec("227.52"))
            .unwrap();
        ledger
    }

    #[test]
    fn buy_debits_cash_and_opens_position() {
        let ledger = scenario_a();
        assert_eq!(ledger.cash(), dec("97724.80"));
        assert_eq!(ledger.shares("AAPL"), 10);
        assert_eq!(ledger.positions().len(), 1);
        assert_eq!(ledger.trades().len(), 1);

        let trade = &ledger.trades()[0];
        assert_eq!(trade.total, dec("2275.20"));
        assert_eq!(trade.origin, TradeOrigin::Manual);
    }

    #[test]
    fn confirmation_message_is_readable() {
        let mut ledger = Ledger::new(dec("1000")).unwrap();
        let c = ledger.execute_trade(Side::Buy, "MSFT", 2, dec("10")).unwrap();
        assert_eq!(c.message, "Bought 2 shares of MSFT");
        let c = ledger.execute_trade(Side::Sell, "MSFT", 1, dec("11")).unwrap();
        assert_eq!(c.message, "Sold 1 shares of MSFT");
    }

    #[test]
    fn oversell_is_rejected_without_side_effects() {
        let mut ledger = scenario_a();
        let err = ledger
            .execute_trade(Side::Sell, "AAPL", 15, dec("230.00"))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientShares {
                symbol: "AAPL".into(),
                requested: 15,
                held: 10
            }
        );
        assert_eq!(ledger.cash(), dec("97724.80"));
        assert_eq!(ledger.shares("AAPL"), 10);
        assert_eq!(ledger.trades().len(), 1);
    }

    #[test]
    fn full_liquidation_removes_the_entry() {
        let mut ledger = scenario_a();
        ledger
            .execute_trade(Side::Sell, "AAPL", 10, dec("230.00"))
            .unwrap();
        assert_eq!(ledger.cash(), dec("100024.80"));
        assert!(ledger.positions().is_empty());
        assert!(!ledger.positions().contains_key("AAPL"));
    }

    #[test]
    fn overdraft_is_rejected_without_side_effects() {
        let mut ledger = Ledger::new(dec("100000")).unwrap();
        let err = ledger
            .execute_trade(Side::Buy, "TSLA", 1_000_000, dec("248.50"))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds { needed, available }
                if needed == dec("248500000") && available == dec("100000")
        ));
        assert_eq!(ledger.cash(), dec("100000"));
        assert!(ledger.positions().is_empty());
        assert!(ledger.trades().is_empty());
    }

    #[test]
    fn buy_of_exactly_all_cash_is_allowed() {
        let mut ledger = Ledger::new(dec("1000")).unwrap();
        ledger.execute_trade(Side::Buy, "X", 4, dec("250")).unwrap();
        assert_eq!(ledger.cash(), Decimal::ZERO);
    }

    #[test]
    fn sell_of_unknown_symbol_is_insufficient_shares() {
        let mut ledger = Ledger::new(dec("1000")).unwrap();
        let err = ledger.execute_trade(Side::Sell, "NFLX", 1, dec("1")).unwrap_err();
        assert_eq!(err.code(), "insufficient_shares");
    }

    #[test]
    fn malformed_inputs_are_invalid_input() {
        let mut ledger = Ledger::new(dec("1000")).unwrap();
        for (qty, price) in [(0, dec("10")), (1, Decimal::ZERO), (1, dec("-1"))] {
            let err = ledger.execute_trade(Side::Buy, "AAPL", qty, price).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidInput(_)), "{err:?}");
        }
        assert!(ledger.trades().is_empty());
        assert_eq!(ledger.cash(), dec("1000"));
    }

    #[test]
    fn symbol_is_taken_as_given() {
        let mut ledger = Ledger::new(dec("1000")).unwrap();
        ledger.execute_trade(Side::Buy, "", 1, dec("10")).unwrap();
        ledger.execute_trade(Side::Buy, " brk.b ", 2, dec("10")).unwrap();
        assert_eq!(ledger.shares(""), 1);
        assert_eq!(ledger.shares(" brk.b "), 2);
        assert_eq!(ledger.cash(), dec("970"));
    }

    #[test]
    fn overflowing_total_is_invalid_input() {
        let mut ledger = Ledger::new(dec("1000")).unwrap();
        let err = ledger
            .execute_trade(Side::Buy, "AAPL", u64::MAX, Decimal::MAX)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[test]
    fn negative_initial_cash_is_rejected() {
        assert!(Ledger::new(dec("-1")).is_err());
    }

    #[test]
    fn value_marks_positions_to_market() {
        let ledger = scenario_a();
        let mut prices = HashMap::new();
        prices.insert("AAPL".to_string(), dec("230.00"));
        assert_eq!(ledger.value(&prices), dec("100024.80"));
        assert_eq!(ledger.value(&prices), ledger.value(&prices));
    }

    #[test]
    fn missing_quote_contributes_zero() {
        let ledger = scenario_a();
        let prices: HashMap<String, Decimal> = HashMap::new();
        assert_eq!(ledger.value(&prices), dec("97724.80"));
    }

    #[test]
    fn revalue_stores_total_value_and_keeps_it_across_trades() {
        let mut ledger = scenario_a();
        let mut prices = BTreeMap::new();
        prices.insert("AAPL".to_string(), dec("230.00"));
        assert_eq!(ledger.revalue(&prices), dec("100024.80"));
        assert_eq!(ledger.total_value(), dec("100024.80"));

        // Selling 5 at the mark keeps value constant.
        ledger.execute_trade(Side::Sell, "AAPL", 5, dec("230.00")).unwrap();
        assert_eq!(ledger.total_value(), dec("100024.80"));

        let snap = ledger.snapshot();
        assert_eq!(snap.pnl, dec("24.80"));
        assert_eq!(snap.positions.get("AAPL"), Some(&5));
    }

    #[test]
    fn replay_reproduces_cash_and_positions() {
        let mut ledger = Ledger::new(dec("50000")).unwrap();
        ledger.execute_trade(Side::Buy, "AAPL", 10, dec("227.52")).unwrap();
        ledger.execute_trade(Side::Buy, "NVDA", 3, dec("875.30")).unwrap();
        let _ = ledger.execute_trade(Side::Sell, "NVDA", 9, dec("870"));
        ledger.execute_trade(Side::Sell, "AAPL", 4, dec("231.10")).unwrap();
        ledger
            .submit(Order::automated(Side::Sell, "NVDA", 3, dec("880"), "take profit"))
            .unwrap();

        let rebuilt = Ledger::replay(ledger.initial_cash(), ledger.trades()).unwrap();
        assert_eq!(rebuilt.cash(), ledger.cash());
        assert_eq!(rebuilt.positions(), ledger.positions());
        assert_eq!(rebuilt.trades(), ledger.trades());
    }

    #[test]
    fn replay_rejects_impossible_history() {
        let mut source = Ledger::new(dec("100")).unwrap();
        source.execute_trade(Side::Buy, "AAPL", 1, dec("50")).unwrap();
        let history = source.trades().to_vec();

        let err = Ledger::replay(dec("10"), &history).unwrap_err();
        assert_eq!(err.code(), "insufficient_funds");
    }
}
