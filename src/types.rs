// src/types.rs
use crate::core::ledger::{LedgerError, PortfolioSnapshot};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = LedgerError;

    /// Accepts exactly the wire tokens `BUY` and `SELL`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(LedgerError::InvalidAction(s.to_string())),
        }
    }
}

/// Latest market snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    pub change: Decimal,
    pub change_pct: Decimal,
    pub volume: u64,
    pub rsi: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeOrigin {
    #[default]
    Manual,
    Automated,
}

/// One executed fill in a ledger's history. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub action: Side,
    pub quantity: u64,
    pub price: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub origin: TradeOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn side(self) -> Option<Side> {
        match self {
            Signal::Buy => Some(Side::Buy),
            Signal::Sell => Some(Side::Sell),
            Signal::Hold => None,
        }
    }
}

/// Output of an [`Advisor`](crate::strategies::traits::Advisor) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Signal,
    pub symbol: Option<String>,
    pub quantity: u64,
    pub confidence: f64,
    pub reasoning: String,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
}

impl Recommendation {
    pub fn hold(provider: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            action: Signal::Hold,
            symbol: None,
            quantity: 0,
            confidence: 0.5,
            reasoning: reasoning.into(),
            provider: provider.into(),
            timestamp: Utc::now(),
        }
    }

    /// Returns the actionable part of the recommendation, if any.
    pub fn order(&self) -> Option<(Side, &str, u64)> {
        let side = self.action.side()?;
        let symbol = self.symbol.as_deref()?;
        if self.quantity == 0 {
            return None;
        }
        Some((side, symbol, self.quantity))
    }
}

// --- Dashboard feed ---

#[derive(Debug, Clone)]
pub enum UiEvent {
    Quotes(Vec<Quote>),
    Portfolio {
        book: String,
        snapshot: PortfolioSnapshot,
    },
    Trade(TradeRecord),
    Recommendation(Recommendation),
    Log(String),
}
