// src/logger.rs
// =============================================================================
// Sets up env_logger for the binary.
//
// - this crate logs at info, or debug with --verbose
// - dependencies (reqwest, hyper...) only show warnings
// - RUST_LOG still overrides both
//
// Logs go to stderr so they never mix with results on stdout.
// =============================================================================

use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use std::io::Write;

pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_CRATE_NAME"), level)
        .parse_env(Env::default())
        .format(|buf, record| {
            let time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            match record.level() {
                Level::Error | Level::Warn => writeln!(
                    buf,
                    "[{} {} {}] {}",
                    time,
                    record.level(),
                    record.target(),
                    record.args()
                ),
                _ => writeln!(buf, "[{}] {}", time, record.args()),
            }
        })
        .init();
}
