// src/main.rs
use anyhow::Context;
use dotenvy::dotenv;
use quantum_trader::api;
use quantum_trader::config::AppConfig;
use quantum_trader::core::engine::AutoTrader;
use quantum_trader::logging;
use quantum_trader::market::collector::QuoteCollector;
use quantum_trader::market::demo::DemoQuoteSource;
use quantum_trader::market::traits::QuoteSource;
use quantum_trader::state::AppState;
use quantum_trader::strategies::build_advisor;
use quantum_trader::tui::{self, UiFeed};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Load Configuration
    let cfg = AppConfig::new().context("failed to load configuration")?;
    let _log_guard = logging::init(&cfg.log, cfg.ui.dashboard)?;

    info!("========================================");
    info!("      QUANTUM TRADER - v{}", env!("CARGO_PKG_VERSION"));
    info!("========================================");
    info!("Symbols: {}", cfg.market.symbols.join(", "));
    info!(
        "Books:   human ${} / bot ${} ({})",
        cfg.portfolio.human_initial_cash,
        cfg.portfolio.bot_initial_cash,
        if cfg.bot.enabled {
            cfg.bot.provider.to_string()
        } else {
            "disabled".to_string()
        }
    );

    // 2. Dashboard channel (only wired when the dashboard runs)
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let ui = if cfg.ui.dashboard {
        UiFeed::new(ui_tx)
    } else {
        drop(ui_tx);
        UiFeed::disabled()
    };

    // 3. Shared state
    let source: Arc<dyn QuoteSource> = Arc::new(DemoQuoteSource::new());
    let state = Arc::new(AppState::new(&cfg, source.name(), ui.clone())?);

    // 4. Background tasks
    let collector = QuoteCollector::new(
        source,
        state.quotes.clone(),
        cfg.market.symbols.clone(),
        vec![state.human.clone(), state.bot.clone()],
        ui.clone(),
    );
    collector.spawn(Duration::from_secs(cfg.market.refresh_secs));

    if cfg.bot.enabled {
        let trader = AutoTrader::new(
            build_advisor(&cfg.bot),
            state.quotes.clone(),
            state.bot.clone(),
            state.analysis.clone(),
            ui.clone(),
        );
        trader.spawn(Duration::from_secs(cfg.bot.interval_secs));
    }

    // 5. HTTP API
    let app = api::build_router(Arc::clone(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .context("invalid server.host / server.port")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.context("server crashed")
    });

    if cfg.ui.dashboard {
        tui::run(ui_rx, format!("Quantum Trader [{}]", addr)).await?;
        server.abort();
    } else {
        tokio::select! {
            res = server => res.context("server task panicked")??,
            _ = tokio::signal::ctrl_c() => info!("Ctrl+C received, shutting down"),
        }
    }

    Ok(())
}
