//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Default directives when `VIGIL_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "vigil_core=info,vigil_analysis=info,vigil_cli=info";

/// Initialize the Vigil tracing/logging system.
///
/// Reads the `VIGIL_LOG` environment variable for per-crate log levels,
/// e.g. `VIGIL_LOG=vigil_analysis=debug,vigil_cli=warn`. Output goes to
/// stderr so reports on stdout stay machine-readable.
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("VIGIL_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // A host application may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
