// src/logging.rs
use crate::config::LogConfig;
use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `log.level`.
///
/// With `to_file` set, events go to a daily rolling file under `log.dir`
/// through a non-blocking writer, keeping the terminal free for the
/// dashboard. The returned guard must stay alive to flush that writer.
pub fn init(cfg: &LogConfig, to_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cfg.level))?;

    if to_file {
        let appender = tracing_appender::rolling::daily(&cfg.dir, "quantum_trader.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))?;
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))?;
        Ok(None)
    }
}
