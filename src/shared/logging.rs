use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `filter`. Calling this more than once is
/// harmless; later calls leave the first subscriber in place and return false.
pub fn init(filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let stdout_layer = fmt::layer().with_target(true).compact();

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(filter, "tracing initialized");
    }
    installed
}
