//! Paper trading desk: cached quotes, simulated trades against in-memory
//! ledgers, and an optional automated trader driven by a rule-based advisor.

pub mod api;
pub mod config;
pub mod core;
pub mod logging;
pub mod market;
pub mod state;
pub mod strategies;
pub mod tui;
pub mod types;
pub mod utils;
