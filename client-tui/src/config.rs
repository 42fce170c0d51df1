//! Runtime tunables for the client. Every value has a compile-time default
//! and can be overridden via a dedicated environment variable.

use std::path::PathBuf;

/// Default directory for rolling log files.
const DEFAULT_LOG_DIR: &str = "logs";

/// Default UI frame interval in milliseconds (~30 fps).
const DEFAULT_FRAME_MS: u64 = 33;

/// Get the log directory.
///
/// Priority:
/// 1. `GROUNDTTY_LOG_DIR` env variable if set
/// 2. `logs` as fallback
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GROUNDTTY_LOG_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(DEFAULT_LOG_DIR)
}

/// Get the frame interval in milliseconds.
///
/// Priority:
/// 1. `GROUNDTTY_FRAME_MS` env variable if set (falls back to the default if
///    the value cannot be parsed as a `u64`)
/// 2. `33` milliseconds as fallback
pub fn frame_interval_ms() -> u64 {
    if let Ok(ms) = std::env::var("GROUNDTTY_FRAME_MS") {
        return ms.parse().unwrap_or(DEFAULT_FRAME_MS);
    }

    DEFAULT_FRAME_MS
}

/// Optional path to a JSON theme file, from `GROUNDTTY_THEME`.
pub fn theme_path() -> Option<PathBuf> {
    std::env::var("GROUNDTTY_THEME").ok().map(PathBuf::from)
}
