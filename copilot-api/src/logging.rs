//! Log filter selection
//!
//! `RUST_LOG` wins over the configured `[logging] level`. Without it the
//! service starts at INFO and switches to the configured level once the
//! configuration is loaded.

use tracing_subscriber::EnvFilter;

/// Directives used before the configuration is loaded
pub const STARTUP_LEVEL: &str = "info";

/// `RUST_LOG` directives, when set and non-blank
pub fn rust_log_directives() -> Option<String> {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Filter to install at startup
///
/// `RUST_LOG` directives are used as given; nothing is layered on top.
pub fn startup_filter(rust_log: Option<&str>, default_directives: &str) -> EnvFilter {
    EnvFilter::new(rust_log.unwrap_or(default_directives))
}

/// Filter to swap in once the configured level is known
///
/// `None` when `RUST_LOG` is set, since it overrides the configuration.
pub fn configured_filter(rust_log: Option<&str>, configured_level: &str) -> Option<EnvFilter> {
    match rust_log {
        Some(_) => None,
        None => Some(EnvFilter::new(configured_level)),
    }
}
