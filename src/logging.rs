//! Tracing and logging setup.
//!
//! Structured logging with configurable output format (pretty or JSON) and
//! environment-based level filtering. Library code only emits through the
//! `tracing` macros; calling this from an application wires a subscriber up.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `default_level` applies when `RUST_LOG` is not set. With `json` enabled
/// the output is machine-parseable; otherwise it is a compact human format.
///
/// Safe to call once per process; later calls lose to the first subscriber
/// and are ignored.
pub fn setup_logging(json: bool, default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact())
            .try_init();
    }
}

/// Whether JSON output was requested through the environment.
///
/// Reads `FORMGUARD_LOG_JSON`; "1" or "true" (any case) enables it.
pub fn should_use_json() -> bool {
    std::env::var("FORMGUARD_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
