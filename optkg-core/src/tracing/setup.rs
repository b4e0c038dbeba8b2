//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::LOG_ENV_VAR;

static INIT: Once = Once::new();

/// Initialize the Opt-KG tracing/logging system.
///
/// Reads the `OPTKG_LOG` environment variable for per-module log levels.
/// Format: `OPTKG_LOG=optkg_allocation::policy=debug,optkg_allocation=info`
///
/// Falls back to `optkg=info` if `OPTKG_LOG` is not set or is invalid.
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("optkg=info"));

        // A subscriber installed elsewhere (e.g. by a host binary) wins.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
