//! Error types for `db-sanitize`.

use std::path::PathBuf;

use db_sanitize::SanitizeError;
use thiserror::Error;

/// Errors surfaced by the `db-sanitize` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),

    #[error("cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("current directory {} is not valid UTF-8", .0.display())]
    NonUtf8CurrentDir(PathBuf),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
