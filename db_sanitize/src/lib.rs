//! Merge scattered `database.sanitize.yml` documents and report the database
//! tables they leave unspecified.
//!
//! The crate is split into two pipelines:
//!
//! - **merge**: [`DocumentLocator`] finds `<pattern>.yml` files beneath the
//!   configured locations, [`merge_files`] deep-merges each group and
//!   [`MergeOutputWriter`] stores `<pattern>.merge.yml`. [`MergeYaml`] wires
//!   the three together.
//! - **analysis**: [`SpecificationReconciler`] compares a sanitize document
//!   against the live tables supplied by a [`LiveUniverse`], and
//!   [`Sanitizer`] exposes the `analyze` and `generate` operations.
//!
//! ```rust,no_run
//! use camino::Utf8Path;
//! use db_sanitize::{GenerateOutcome, Sanitizer};
//!
//! # fn run() -> db_sanitize::SanitizeResult<()> {
//! let sanitizer = Sanitizer::new(["users", "cache", "node_revision"]);
//! let analysis = sanitizer.analyze(Utf8Path::new("database.sanitize.yml"))?;
//! for table in analysis.unspecified.iter() {
//!     println!("{table}");
//! }
//! if let GenerateOutcome::Fragment(yaml) =
//!     sanitizer.generate(Utf8Path::new("database.sanitize.yml"), "my_module")?
//! {
//!     println!("{yaml}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generate;
pub mod locate;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod universe;

pub use config::{MergeSettings, MergeYamlConfig};
pub use error::{SanitizeError, SanitizeResult};
pub use generate::{EntryDefinition, GenerateOutcome, QueryTemplate, SanitizeDocument};
pub use locate::{DocumentGroup, DocumentLocator};
pub use merge::{MergedDocument, deep_merge, merge_documents, merge_files};
pub use output::MergeOutputWriter;
pub use pipeline::{Analysis, DATABASE_SANITIZE_PATTERN, MergeYaml, MergedFile, Sanitizer};
pub use reconcile::{DocumentSource, ParseFailurePolicy, SpecificationReconciler, UnspecifiedSet};
pub use universe::{LiveUniverse, TableList};

/// Re-export of the YAML crate backing [`MergedDocument`].
pub use serde_yaml;
