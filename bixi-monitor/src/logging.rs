//! Console logging setup.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*};

/// Install the global subscriber.
///
/// `level` is the default directive (`info`, `debug`, ...); `RUST_LOG`
/// overrides it. Unknown levels fall back to `info`.
pub fn init_logging(level: &str) -> Result<(), TryInitError> {
    let default: Directive = level.parse().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{level}', defaulting to 'info'");
        LevelFilter::INFO.into()
    });

    let filter = EnvFilter::builder()
        .with_default_directive(default)
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_default());

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
}
