//! Diagnostic logging on stderr
//!
//! Filtering follows the `RUST_LOG` environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=datacards_lib::projector=debug` - module-level filtering
//!
//! Without `RUST_LOG` only warnings are shown, or debug logs when `--debug` is passed.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter directive when `RUST_LOG` is unset
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "warn"
    }
}

/// Install the stderr subscriber. Fails if a global subscriber is already set.
pub fn init(debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .try_init()
        .map_err(|e| eyre!("Failed to initialize logging: {}", e))
}
