//! Tracing subscriber setup.
//!
//! Output goes to stderr so command results on stdout stay machine readable.
//! Filtering follows `RUST_LOG` and defaults to `warn`, e.g.
//! `RUST_LOG=snow_adapter=debug` to see every request the connector sends.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{AppError, AppResult};

/// Install the global subscriber.
///
/// # Errors
/// Returns an error if a subscriber has already been installed.
pub fn init() -> AppResult<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()
        .map_err(|err| AppError::Configuration(format!("failed to initialize tracing: {err}")))
}

/// Same as [`init`] but tolerates repeated calls from tests.
pub fn init_test() {
    let _ = init();
}
