//! Pack station
//!
//! The order review screen of a warehouse packing station: barcode scans
//! toggle items packed, and once everything is in the box the packer buys,
//! prints and voids labels against HQ before completing the order.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub use hq_client;
pub use pack_printer;
pub use shared;

pub mod config;
pub mod core;
pub mod error;
pub mod gating;
pub mod pack;
pub mod scan;
pub mod terminal;

pub use config::{Cli, Config};
pub use core::{ScreenController, ScreenSnapshot};
pub use error::{StationError, StationResult};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
        )
    }
}

fn env_filter() -> EnvFilter {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        from_env
    } else if cfg!(debug_assertions) {
        EnvFilter::new("info,hyper=warn,reqwest=warn,pack_station=debug,hq_client=debug")
    } else {
        EnvFilter::new("info,hyper=warn,reqwest=warn")
    }
}

/// Install the global subscriber
///
/// With a log directory, output goes to a daily rolling file and the
/// returned guard must be held until exit. Without one, logs go to stderr.
pub fn init_logging(log_dir: Option<&Path>) -> StationResult<Option<WorkerGuard>> {
    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(
                fmt::layer()
                    .with_timer(LocalTimer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir)?;
    let file_appender = rolling::daily(log_dir, "pack-station.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_writer(non_blocking_file);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .init();

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        let msg = info.to_string();
        eprintln!("!!! PACK STATION PANIC !!!\nMessage: {}\nBacktrace:\n{}", msg, backtrace);
        tracing::error!(target: "panic", message = %msg, backtrace = %backtrace, "panic occurred");
    }));

    tracing::info!(path = %log_dir.display(), "Tracing initialized");
    Ok(Some(guard))
}
