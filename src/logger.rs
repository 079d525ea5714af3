//! Logging setup.
//!
//! Library code only emits `tracing` events. Binaries call [`init_logger`]
//! once; `RUST_LOG` directives are honoured on top of the chosen level.

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Integer levels as stored in settings files, ten apart like Python's
pub const DEBUG: i32 = 10;
pub const INFO: i32 = 20;
pub const WARNING: i32 = 30;
pub const ERROR: i32 = 40;
pub const CRITICAL: i32 = 50;

/// Tracing level for an integer level; anything above `ERROR` maps to error
pub fn level_from_int(level: i32) -> Level {
    [(DEBUG, Level::DEBUG), (INFO, Level::INFO), (WARNING, Level::WARN)]
        .into_iter()
        .find(|(ceiling, _)| level <= *ceiling)
        .map_or(Level::ERROR, |(_, tracing_level)| tracing_level)
}

/// Parse a level name such as `info` or `WARNING`
pub fn level_from_name(name: &str) -> Option<i32> {
    match name.to_ascii_uppercase().as_str() {
        "DEBUG" | "TRACE" => Some(DEBUG),
        "INFO" => Some(INFO),
        "WARN" | "WARNING" => Some(WARNING),
        "ERROR" => Some(ERROR),
        "CRITICAL" => Some(CRITICAL),
        _ => None,
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Calling it twice is harmless: the second subscriber is dropped.
pub fn init_logger(level: i32, json: bool) {
    let filter = EnvFilter::from_default_env()
        .add_directive(LevelFilter::from_level(level_from_int(level)).into());
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
