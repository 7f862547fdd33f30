//! Wirejam Logging
//!
//! tracing-subscriber setup shared by the CLI. The numeric `-d` verbosity
//! maps onto a [`LogLevel`]; `RUST_LOG` overrides the computed level when
//! set in the environment.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Log level selected by the CLI verbosity counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Map numeric verbosity: 0 disables logging entirely, 1 = error,
    /// 2 = warn, 3 = info; anything above 3 is debug.
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    fn directive(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Initialize the global subscriber.
///
/// Fails if a subscriber is already installed; callers that do not care
/// (tests, repeated init) use [`init`] instead.
pub fn try_init(level: LogLevel) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish()
        .try_init()
}

/// Initialize the global subscriber, ignoring an already-installed one.
pub fn init(level: LogLevel) {
    let _ = try_init(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_mapping() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Off);
        assert_eq!(LogLevel::from_verbosity(1), LogLevel::Error);
        assert_eq!(LogLevel::from_verbosity(2), LogLevel::Warn);
        assert_eq!(LogLevel::from_verbosity(3), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(4), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(9), LogLevel::Debug);
    }

    #[test]
    fn init_is_idempotent() {
        init(LogLevel::Info);
        init(LogLevel::Debug);
    }
}
