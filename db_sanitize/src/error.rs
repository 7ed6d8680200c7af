//! Error types shared by the merge and reconciliation pipelines.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type SanitizeResult<T> = Result<T, SanitizeError>;

/// Errors surfaced while merging sanitize documents or reconciling them
/// against the live table list.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SanitizeError {
    /// A required merge configuration key was absent or empty.
    #[error("merge-yaml configuration is missing '{key}'")]
    MissingConfig {
        /// Configuration key that was not supplied.
        key: &'static str,
    },

    /// The merge configuration could not be gathered or deserialised.
    #[error("failed to load merge-yaml configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The output directory was absent and could not be created.
    #[error("output directory does not exist and could not be created: {path}")]
    OutputDirectory {
        /// Directory that could not be prepared.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An explicitly requested document does not exist.
    #[error("file {path} does not exist")]
    NotFound {
        /// Path that was requested.
        path: Utf8PathBuf,
    },

    /// A document could not be parsed as YAML.
    #[error("unable to parse the file {path} as YAML: {source}")]
    Parse {
        /// Document that failed to parse.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        #[source]
        source: serde_yaml::Error,
    },

    /// A merged or generated document could not be emitted as YAML.
    #[error("failed to serialise YAML: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// The live universe could not be enumerated.
    #[error("failed to enumerate live tables from {origin}: {source}")]
    Universe {
        /// Description of the collaborator that failed.
        origin: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Generic file-system failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed when the failure occurred.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl SanitizeError {
    /// Wraps an I/O failure with the path that triggered it.
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a YAML parser failure with the document path.
    pub(crate) fn parse(path: impl Into<Utf8PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` when the error is a usage problem (the caller asked for
    /// a document that does not exist) rather than a processing failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<figment::Error> for SanitizeError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
