//! Diagnostic logging for `db-sanitize`.

use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Filter applied when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs a formatting subscriber writing to standard error.
///
/// Standard output is reserved for command results so it can be piped.
pub fn init() -> Result<(), CliError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}
