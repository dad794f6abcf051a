use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "concierge";

/// Set up file-only tracing. The TUI owns the terminal, so nothing is ever
/// written to stdout or stderr.
pub fn init() -> Result<PathBuf> {
    let log_dir = resolve_log_dir()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // Keep the guard alive for the life of the process so buffered lines
    // are flushed on shutdown.
    let _ = LOG_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("concierge=info,reqwest=warn,hyper=warn"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(false)
        .with_ansi(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();

    Ok(log_dir)
}

fn resolve_log_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
        .ok_or_else(|| anyhow!("Could not find data directory"))?;
    let dir = base.join("concierge").join("logs");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
