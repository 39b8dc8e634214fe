//! Terminal logging using simplelog
//!
//! Logs go to stderr so they interleave sanely with CI job output.
//! Level comes from `RUST_LOG` (default `info`).

use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

/// Initialize terminal logging
pub fn init() {
    let level = std::env::var("RUST_LOG")
        .map(|v| match v.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        })
        .unwrap_or(LevelFilter::Info);

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .build();

    // Ignore re-init errors so tests can call init() freely
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}
