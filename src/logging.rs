//! Log configuration.
//!
//! Components never reach for a process-wide logger on their own: they log
//! through the [`tracing::Dispatch`] handed to them in
//! [`ClientConfig`](crate::ClientConfig). This module builds that dispatcher
//! from the `LOG_LEVEL` environment variable.

use std::env;

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Environment variable that sets the log verbosity.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Verbosity used when `LOG_LEVEL` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Build a stderr dispatcher at the level named by `LOG_LEVEL` (default `info`).
pub fn dispatch_from_env() -> Dispatch {
    let level = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    dispatch_with_level(&level)
}

/// Build a stderr dispatcher for the given level or filter directive.
///
/// Unparseable directives fall back to [`DEFAULT_LOG_LEVEL`].
pub fn dispatch_with_level(level: &str) -> Dispatch {
    let filter = EnvFilter::try_new(level.to_lowercase())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    Dispatch::new(subscriber)
}

/// Install [`dispatch_from_env`] as the global default.
///
/// Intended for binaries. Returns `false` if a global default was already set.
pub fn init() -> bool {
    tracing::dispatcher::set_global_default(dispatch_from_env()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_is_case_insensitive() {
        let dispatch = dispatch_with_level("DEBUG");
        tracing::dispatcher::with_default(&dispatch, || {
            assert!(tracing::enabled!(tracing::Level::DEBUG));
            assert!(!tracing::enabled!(tracing::Level::TRACE));
        });
    }
}
