//! Reconciliation of declared sanitize entries against live tables.
//!
//! A sanitize document has the shape
//!
//! ```yaml
//! sanitize:
//!   <owner>:
//!     <table>:
//!       description: ...
//!       query: ...
//! ```
//!
//! Table names ending in `*` cover every live table sharing the prefix.

use std::collections::HashSet;

use camino::Utf8PathBuf;
use serde_yaml::{Mapping, Value};

use crate::error::{SanitizeError, SanitizeResult};
use crate::merge::{MergedDocument, read_document};

/// Top-level key holding the owner mapping.
pub const SANITIZE_KEY: &str = "sanitize";

/// Suffix marking an entry name as a prefix match.
pub const WILDCARD: char = '*';

const DESCRIPTION_KEY: &str = "description";
const QUERY_KEY: &str = "query";

/// Where the sanitize document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    /// A YAML file on disk.
    Path(Utf8PathBuf),
    /// A document already merged in memory.
    Merged(MergedDocument),
}

impl DocumentSource {
    fn label(&self) -> String {
        match self {
            Self::Path(path) => path.to_string(),
            Self::Merged(_) => "the merged sanitize document".to_owned(),
        }
    }
}

impl From<Utf8PathBuf> for DocumentSource {
    fn from(path: Utf8PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<MergedDocument> for DocumentSource {
    fn from(document: MergedDocument) -> Self {
        Self::Merged(document)
    }
}

/// What to do when the sanitize document is not valid YAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseFailurePolicy {
    /// Log the failure and report every live table as unspecified.
    #[default]
    Lenient,
    /// Return the parse error to the caller.
    Strict,
}

/// Sorted, duplicate-free live names not covered by the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnspecifiedSet {
    names: Vec<String>,
}

impl UnspecifiedSet {
    fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Returns `true` when every live table is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of unspecified tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Unspecified table names in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    /// Iterates over unspecified table names in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Consumes the set, returning the sorted names.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

/// Computes which live tables a sanitize document leaves unspecified.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecificationReconciler {
    policy: ParseFailurePolicy,
}

impl SpecificationReconciler {
    /// Creates a reconciler applying `policy` to malformed documents.
    #[must_use]
    pub const fn new(policy: ParseFailurePolicy) -> Self {
        Self { policy }
    }

    /// Policy applied to malformed documents.
    #[must_use]
    pub const fn policy(&self) -> ParseFailurePolicy {
        self.policy
    }

    /// Returns the live tables not covered by `source`.
    ///
    /// Documents that cannot be interpreted (empty, missing the `sanitize`
    /// key, or malformed under the lenient policy) leave every live table
    /// unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::NotFound`] when a document path does not
    /// exist, [`SanitizeError::Io`] when it cannot be read and
    /// [`SanitizeError::Parse`] for malformed YAML under
    /// [`ParseFailurePolicy::Strict`].
    pub fn unspecified(
        &self,
        source: &DocumentSource,
        universe: &[String],
    ) -> SanitizeResult<UnspecifiedSet> {
        let label = source.label();
        match source {
            DocumentSource::Path(path) => {
                if !path.exists() {
                    return Err(SanitizeError::NotFound { path: path.clone() });
                }
                match read_document(path) {
                    Ok(document) => Ok(reconcile(&label, document.as_mapping(), universe)),
                    Err(err @ SanitizeError::Parse { .. }) => match self.policy {
                        ParseFailurePolicy::Strict => Err(err),
                        ParseFailurePolicy::Lenient => {
                            tracing::error!(
                                file = %label,
                                error = %err,
                                "unable to parse the file as YAML"
                            );
                            Ok(everything(universe))
                        }
                    },
                    Err(err) => Err(err),
                }
            }
            DocumentSource::Merged(document) => {
                Ok(reconcile(&label, Some(document.as_mapping()), universe))
            }
        }
    }
}

fn everything(universe: &[String]) -> UnspecifiedSet {
    UnspecifiedSet::from_names(universe.iter().cloned())
}

fn reconcile(label: &str, root: Option<&Mapping>, universe: &[String]) -> UnspecifiedSet {
    let Some(root) = root else {
        tracing::error!(file = %label, "the file is empty or not a mapping");
        return everything(universe);
    };
    let Some(owners) = root.get(SANITIZE_KEY) else {
        tracing::error!(file = %label, "the file does not define a 'sanitize' key");
        return everything(universe);
    };
    let owners = match owners {
        Value::Mapping(owners) if !owners.is_empty() => owners,
        Value::Mapping(_) | Value::Null => {
            tracing::info!(file = %label, "the 'sanitize' key declares no tables");
            return everything(universe);
        }
        _ => {
            tracing::error!(file = %label, "the 'sanitize' key is not a mapping");
            return everything(universe);
        }
    };

    let covered = covered_names(owners, universe);
    let (specified, missing): (Vec<&String>, Vec<&String>) =
        universe.iter().partition(|name| covered.contains(*name));
    for table in specified {
        tracing::debug!(table = %table, "database table was already specified");
    }

    let missing = UnspecifiedSet::from_names(missing.into_iter().cloned());
    if missing.is_empty() {
        tracing::info!(file = %label, "all database tables are already specified");
    }
    missing
}

/// Collects every name covered by well-formed entries, expanding wildcards
/// against `universe`.
fn covered_names(owners: &Mapping, universe: &[String]) -> HashSet<String> {
    let mut declared = HashSet::new();
    let mut covered = HashSet::new();
    for (owner_key, tables) in owners {
        let owner = key_name(owner_key).unwrap_or_default();
        let Some(tables) = tables.as_mapping() else {
            tracing::warn!(owner = %owner, "owner does not declare a mapping of tables");
            continue;
        };
        for (table_key, definition) in tables {
            let Some(table) = key_name(table_key) else {
                tracing::warn!(owner = %owner, "skipping table with a non-scalar name");
                continue;
            };
            if !has_key(definition, DESCRIPTION_KEY) {
                tracing::warn!(
                    table = %table,
                    owner = %owner,
                    "table does not specify a 'description' key"
                );
                continue;
            }
            if !has_key(definition, QUERY_KEY) {
                tracing::warn!(
                    table = %table,
                    owner = %owner,
                    "table does not specify a 'query' key"
                );
                continue;
            }
            if !declared.insert(table.clone()) {
                continue;
            }
            match table.strip_suffix(WILDCARD) {
                Some(prefix) => covered.extend(
                    universe
                        .iter()
                        .filter(|name| name.starts_with(prefix))
                        .cloned(),
                ),
                None => {
                    covered.insert(table);
                }
            }
        }
    }
    covered
}

fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(name) => Some(name.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn has_key(definition: &Value, key: &str) -> bool {
    definition
        .as_mapping()
        .is_some_and(|mapping| mapping.contains_key(key))
}
