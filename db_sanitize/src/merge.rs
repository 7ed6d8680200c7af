//! Deep merge of YAML documents.
//!
//! Merge semantics:
//! - Mappings: merged key by key (recursive), first-seen key order
//! - Sequences: concatenated (later entries appended)
//! - Scalars and mismatched types: later value wins

use camino::{Utf8Path, Utf8PathBuf};
use serde::de::Error as _;
use serde_yaml::{Mapping, Value};

use crate::error::{SanitizeError, SanitizeResult};

/// Canonical document produced by merging every file in a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedDocument {
    root: Mapping,
}

impl MergedDocument {
    /// Wraps an already merged mapping.
    #[must_use]
    pub const fn new(root: Mapping) -> Self {
        Self { root }
    }

    /// Top-level mapping of the document.
    #[must_use]
    pub const fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    /// Consumes the document, returning it as a YAML value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Mapping(self.root)
    }

    /// Serialises the document with two-space indentation, preserving key
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::Serialize`] when emission fails.
    pub fn to_yaml(&self) -> SanitizeResult<String> {
        serde_yaml::to_string(&self.root).map_err(SanitizeError::Serialize)
    }
}

/// Deep merge two YAML values, `overlay` taking precedence.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            merge_mapping(&mut base_map, overlay_map);
            Value::Mapping(base_map)
        }
        (Value::Sequence(mut base_seq), Value::Sequence(overlay_seq)) => {
            base_seq.extend(overlay_seq);
            Value::Sequence(base_seq)
        }
        (_, overlay) => overlay,
    }
}

fn merge_mapping(base: &mut Mapping, overlay: Mapping) {
    for (key, overlay_value) in overlay {
        // `Mapping::remove` swaps entries and would reorder keys.
        if let Some(slot) = base.get_mut(&key) {
            let current = std::mem::replace(slot, Value::Null);
            *slot = deep_merge(current, overlay_value);
        } else {
            base.insert(key, overlay_value);
        }
    }
}

/// Merges documents in order, the first acting as the accumulator.
///
/// Documents that are not mappings contribute nothing.
#[must_use]
pub fn merge_documents<I>(documents: I) -> MergedDocument
where
    I: IntoIterator<Item = Value>,
{
    let mut root = Mapping::new();
    for document in documents {
        merge_mapping(&mut root, into_mapping(document));
    }
    MergedDocument::new(root)
}

fn into_mapping(document: Value) -> Mapping {
    match document {
        Value::Mapping(mapping) => mapping,
        Value::Tagged(tagged) => into_mapping(tagged.value),
        _ => Mapping::new(),
    }
}

/// Parses YAML text, treating blank input as `null`.
///
/// # Errors
///
/// Returns [`SanitizeError::Parse`] naming `origin` when the text is not
/// valid YAML.
pub fn parse_document(origin: &Utf8Path, contents: &str) -> SanitizeResult<Value> {
    if contents.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(contents).map_err(|err| SanitizeError::parse(origin, err))
}

/// Reads and parses a YAML file.
///
/// # Errors
///
/// Returns [`SanitizeError::Io`] when the file cannot be read and
/// [`SanitizeError::Parse`] when it is not valid UTF-8 or not valid YAML.
pub fn read_document(path: &Utf8Path) -> SanitizeResult<Value> {
    let bytes = std::fs::read(path).map_err(|err| SanitizeError::io(path, err))?;
    let contents = std::str::from_utf8(&bytes)
        .map_err(|err| SanitizeError::parse(path, serde_yaml::Error::custom(err)))?;
    parse_document(path, contents)
}

/// Reads, parses and merges `paths` in order.
///
/// Any unreadable or malformed file aborts the whole merge.
///
/// # Errors
///
/// Propagates the first [`SanitizeError::Io`] or [`SanitizeError::Parse`]
/// encountered.
pub fn merge_files(paths: &[Utf8PathBuf]) -> SanitizeResult<MergedDocument> {
    let documents = paths
        .iter()
        .map(|path| read_document(path))
        .collect::<SanitizeResult<Vec<_>>>()?;
    Ok(merge_documents(documents))
}
