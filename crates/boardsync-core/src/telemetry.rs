//! Tracing subscriber setup for the `boardsync` binary.
//!
//! [`init_tracing`] installs a global subscriber once per process; later
//! calls are ignored. `RUST_LOG` overrides the default filter. Log lines go
//! to stderr; stdout carries the run report.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: `level` for boardsync crates,
/// warnings only for everything else (HTTP stack included).
pub fn default_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_ascii_lowercase();
    EnvFilter::new(format!(
        "warn,boardsync_core={level},boardsync_github={level},boardsync={level}"
    ))
}

/// Install the global subscriber.
///
/// * `json`: newline-delimited JSON lines for log aggregation; plain text otherwise.
/// * `level`: verbosity for boardsync's own events when `RUST_LOG` is not set.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}
