//! Tracing/logging initialization for the `OTTclaim` server.
//!
//! `RUST_LOG` always wins. Without it the filter is derived from the
//! configured log level and applied to the `OTTclaim` crates only, with
//! request tracing from `tower_http` kept at `warn` unless the level is
//! `debug` or `trace`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CRATE_TARGETS: &[&str] = &["ottclaim_server", "ottclaim_core"];

/// Build the env-filter directive used when `RUST_LOG` is not set.
pub fn default_directive(log_level: &str) -> String {
    let level = match log_level.trim().to_ascii_lowercase().as_str() {
        lvl @ ("error" | "warn" | "info" | "debug" | "trace") => lvl.to_string(),
        _ => "info".to_string(),
    };
    let http_level = if matches!(level.as_str(), "debug" | "trace") {
        level.as_str()
    } else {
        "warn"
    };

    let mut parts: Vec<String> = CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect();
    parts.push(format!("tower_http={http_level}"));
    parts.join(",")
}

/// Initialise the global tracing subscriber.
///
/// * `log_level` -- configured level (`server.log_level`), used when
///   `RUST_LOG` is unset.
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
pub fn init_tracing(log_level: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_directive(log_level)),
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_keeps_http_traces_quiet() {
        assert_eq!(
            default_directive("info"),
            "ottclaim_server=info,ottclaim_core=info,tower_http=warn"
        );
    }

    #[test]
    fn debug_enables_http_traces() {
        assert_eq!(
            default_directive("DEBUG"),
            "ottclaim_server=debug,ottclaim_core=debug,tower_http=debug"
        );
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert!(default_directive("verbose").starts_with("ottclaim_server=info"));
    }
}
