//! Diagnostic logging setup
//!
//! Logs go to stderr so the interactive menu on stdout stays readable. The
//! level is taken from `RUST_LOG` and defaults to showing cache hits and
//! fetches.

use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "npsites=info";

/// Installs the global tracing subscriber
///
/// Does nothing if a subscriber is already installed (e.g., by a test harness).
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .try_init();
}
