//! Logging Infrastructure
//!
//! Structured logging for development (pretty console) and production
//! (JSON console plus a daily rolling file).

use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the logger with console output only
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` wins over `log_level` when set. Calling this twice is harmless;
/// the second call leaves the first subscriber in place.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&Path>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "kafe_server={level},shared={level},tower_http={level}"
        ))
    });

    let file_layer = log_dir.filter(|dir| dir.exists()).map(|dir| {
        let file_appender = tracing_appender::rolling::daily(dir, "kafe-server");
        fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(true)
    });

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let result = if json {
        registry
            .with(fmt::layer().json().with_target(false))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(false)
                    .with_target(false),
            )
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Logger already initialized");
    }
}
