//! Logging initialization
//!
//! Human-readable output goes to stderr so stdout stays clean for `--json`.
//! With `SWAP_LOG_DIR` set, a daily rotated file is written as well.

use super::config::{LogConfig, DEFAULT_LOG_FILTER};
use std::fs;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging system
///
/// Sets up:
/// - stderr output filtered by `RUST_LOG`
/// - Optional daily rotated file log with non-blocking writes
/// - Panic hook integration for crash logging
pub fn init() {
    let config = LogConfig::from_env();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .boxed();

    let mut file_guard = None;
    let file_layer = match &config.log_dir {
        Some(dir) => match fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, config.log_file_name);
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                file_guard = Some(guard);

                let layer = fmt::layer()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false); // No ANSI codes in log files
                Some(if config.json_file { layer.json().boxed() } else { layer.boxed() })
            }
            Err(e) => {
                eprintln!("Warning: Failed to create log directory: {}", e);
                None
            }
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::debug!(
        log_file = ?config.log_file(),
        log_level = %config.log_level,
        json_file = config.json_file,
        "Logging initialized"
    );

    setup_panic_hook();

    // Keep the file writer alive for the lifetime of the program
    if let Some(guard) = file_guard {
        std::mem::forget(guard);
    }
}

/// Set up panic hook to log panics before the default handler runs
fn setup_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic message".to_string()
        };

        tracing::error!(
            location = %location,
            message = %message,
            "application panic"
        );

        default_panic(panic_info);
    }));
}
