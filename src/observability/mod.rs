//! Logging initialisation
//!
//! `RUST_LOG` takes precedence over the level passed on the command line.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Build the filter directive used when `RUST_LOG` is unset
pub fn default_filter(log_level: &str) -> String {
    if log_level == "trace" {
        format!("receipt_kit={log_level},reqwest=debug")
    } else {
        format!("receipt_kit={log_level}")
    }
}

/// Install the global tracing subscriber
///
/// Calling this twice is harmless; the second installation is ignored.
pub fn init_logging(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter("info"), "receipt_kit=info");
        assert_eq!(default_filter("trace"), "receipt_kit=trace,reqwest=debug");
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging("debug", LogFormat::Text);
        init_logging("debug", LogFormat::Json);
    }
}
