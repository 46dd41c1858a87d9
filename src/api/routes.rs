//! Axum router and HTTP handlers.
//!
//! `build_router` is the single entry point; `main.rs` attaches middleware
//! layers so tests can drive the bare router.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, warn};

use crate::api::types::{StatusResponse, TradeRequest, TradeResponse};
use crate::core::ledger::{LedgerError, Order};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/market-data", get(market_data))
        .route("/api/portfolio", get(portfolio))
        .route("/api/trade", post(trade))
        .route("/api/bot/portfolio", get(bot_portfolio))
        .route("/api/bot/analysis", get(bot_analysis))
        .route("/api/status", get(status))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

pub(crate) async fn market_data(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(st.quotes.all().await))
}

// ---------------------------------------------------------------------------
// Portfolios
// ---------------------------------------------------------------------------

pub(crate) async fn portfolio(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(st.human.snapshot().await))
}

pub(crate) async fn bot_portfolio(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(st.bot.snapshot().await))
}

pub(crate) async fn bot_analysis(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(st.analysis.read().await.clone()))
}

// ---------------------------------------------------------------------------
// POST /api/trade
// ---------------------------------------------------------------------------

/// Executes a manual trade on the human book.
///
/// Malformed requests answer `400`, including bodies that fail to
/// deserialize; trades the book cannot cover answer `409`. Either way the
/// body carries `success: false` and the reason.
pub(crate) async fn trade(
    State(st): State<Arc<AppState>>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Response {
    let result = match parse_order(payload) {
        Ok(order) => st.human.submit(order).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(confirmation) => (
            StatusCode::OK,
            Json(TradeResponse {
                success: true,
                message: confirmation.message,
                error: None,
                trade: Some(confirmation.trade),
            }),
        )
            .into_response(),
        Err(e) => (
            status_for(&e),
            Json(TradeResponse {
                success: false,
                message: e.to_string(),
                error: Some(e.code().to_string()),
                trade: None,
            }),
        )
            .into_response(),
    }
}

fn parse_order(payload: Result<Json<TradeRequest>, JsonRejection>) -> Result<Order, LedgerError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Unreadable trade request: {}", rejection.body_text());
        LedgerError::InvalidInput(format!("malformed trade request: {}", rejection.body_text()))
    })?;
    info!(
        "Trade request: {} {} x{} @ {}",
        req.action, req.symbol, req.quantity, req.price
    );
    req.into_order()
}

fn status_for(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::InvalidInput(_) | LedgerError::InvalidAction(_) => StatusCode::BAD_REQUEST,
        LedgerError::InsufficientFunds { .. } | LedgerError::InsufficientShares { .. } => {
            StatusCode::CONFLICT
        }
    }
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

pub(crate) async fn status(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: "running".to_string(),
            last_update: st.quotes.last_update().await,
            symbols_tracked: st.info.symbols_tracked,
            data_source: st.info.data_source.clone(),
            update_interval: st.info.update_interval_secs,
            bot_enabled: st.info.bot_enabled,
        }),
    )
}
