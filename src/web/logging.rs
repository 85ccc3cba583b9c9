//! Browser console logging. `tracing` events fall through to `log` when no
//! subscriber is installed, and `console_log` writes those records to the
//! console at the matching level.

use tracing::Level;

/// Installs the console logger. Later calls are ignored.
pub fn init(level: Level) {
    let _ = console_log::init_with_level(log_level(level));
}

fn log_level(level: Level) -> log::Level {
    match level {
        Level::ERROR => log::Level::Error,
        Level::WARN => log::Level::Warn,
        Level::INFO => log::Level::Info,
        Level::DEBUG => log::Level::Debug,
        _ => log::Level::Trace,
    }
}
