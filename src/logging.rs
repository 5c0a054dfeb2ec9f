//! Tracing initialization.
//!
//! Logs go to stderr with a local timestamp. The level comes from
//! `--log-level` only; `RUST_LOG` is not consulted.

use categorize::LogLevel;
use chrono::Local;
use std::fmt as stdfmt;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

/// Human-friendly timestamp (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

// tracing has nothing above ERROR, so critical shares it.
fn to_level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warning => LevelFilter::WARN,
        LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
    }
}

pub fn init_tracing(level: LogLevel) {
    let fmt_layer = tsfmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalHumanTime)
        .with_target(false);

    // A second initialization (e.g. in tests) keeps the first subscriber.
    let _ = registry()
        .with(to_level_filter(level))
        .with(fmt_layer)
        .try_init();
}
