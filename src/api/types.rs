//! Request and response bodies for the HTTP API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::ledger::{LedgerError, Order};
use crate::types::{Side, TradeRecord};

/// Body of `POST /api/trade`, as typed by the user.
#[derive(Clone, Debug, Deserialize)]
pub struct TradeRequest {
    pub action: String,
    pub symbol: String,
    pub quantity: i64,
    pub price: Decimal,
}

impl TradeRequest {
    pub fn into_order(self) -> Result<Order, LedgerError> {
        let action: Side = self.action.parse()?;
        let quantity = u64::try_from(self.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                LedgerError::InvalidInput(format!(
                    "quantity must be a positive integer, got {}",
                    self.quantity
                ))
            })?;
        Ok(Order::manual(action, self.symbol, quantity, self.price))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TradeResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade: Option<TradeRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always "running" while the process serves requests.
    pub status: String,
    pub last_update: Option<DateTime<Utc>>,
    pub symbols_tracked: usize,
    pub data_source: String,
    pub update_interval: u64,
    pub bot_enabled: bool,
}
