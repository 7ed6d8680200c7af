//! Discovery of YAML documents matching configured base names.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::config::{MergeSettings, anchor};
use crate::error::{SanitizeError, SanitizeResult};

/// Extension shared by every discovered document.
pub const YAML_EXTENSION: &str = ".yml";

/// Discovered documents grouped by the pattern they matched.
///
/// Paths within a group are sorted by their string form so the merge order
/// does not depend on directory iteration order. Patterns without matches are
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentGroup {
    groups: BTreeMap<String, Vec<Utf8PathBuf>>,
}

impl DocumentGroup {
    /// Returns `true` when no documents were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of patterns with at least one match.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Documents matched by `pattern`, in merge order.
    #[must_use]
    pub fn get(&self, pattern: &str) -> Option<&[Utf8PathBuf]> {
        self.groups.get(pattern).map(Vec::as_slice)
    }

    /// Iterates over `(pattern, paths)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Utf8PathBuf])> {
        self.groups
            .iter()
            .map(|(pattern, paths)| (pattern.as_str(), paths.as_slice()))
    }

    fn push(&mut self, pattern: &str, path: Utf8PathBuf) {
        self.groups.entry(pattern.to_owned()).or_default().push(path);
    }

    fn finalise(&mut self) {
        for paths in self.groups.values_mut() {
            paths.sort_by(|left, right| left.as_str().cmp(right.as_str()));
            paths.dedup();
        }
    }
}

/// Recursively scans locations for `<pattern>.yml` files.
#[derive(Debug, Clone)]
pub struct DocumentLocator {
    project_root: Utf8PathBuf,
    locations: Vec<Utf8PathBuf>,
    patterns: Vec<String>,
}

impl DocumentLocator {
    /// Creates a locator; relative `locations` are anchored at `project_root`.
    #[must_use]
    pub fn new(
        project_root: impl Into<Utf8PathBuf>,
        locations: Vec<Utf8PathBuf>,
        patterns: Vec<String>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            locations,
            patterns,
        }
    }

    /// Creates a locator from validated settings.
    #[must_use]
    pub fn from_settings(settings: &MergeSettings) -> Self {
        Self::new(
            settings.project_root(),
            settings.locations().to_vec(),
            settings.patterns().to_vec(),
        )
    }

    /// Resolves every configured location to an existing absolute directory.
    ///
    /// Locations that do not exist are skipped.
    #[must_use]
    pub fn resolved_locations(&self) -> Vec<Utf8PathBuf> {
        self.locations
            .iter()
            .filter_map(|location| resolve_location(&self.project_root, location))
            .collect()
    }

    /// Walks every resolved location and groups matching documents.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::Io`] when an existing directory cannot be
    /// read. Entries with non-UTF-8 names are skipped rather than reported.
    pub fn locate(&self) -> SanitizeResult<DocumentGroup> {
        let mut group = DocumentGroup::default();
        if self.patterns.is_empty() {
            return Ok(group);
        }
        for location in self.resolved_locations() {
            let dir = Dir::open_ambient_dir(&location, ambient_authority())
                .map_err(|err| SanitizeError::io(location.clone(), err))?;
            self.collect_matches(&dir, &location, &mut group)?;
        }
        group.finalise();
        Ok(group)
    }

    fn collect_matches(
        &self,
        dir: &Dir,
        base: &Utf8Path,
        group: &mut DocumentGroup,
    ) -> SanitizeResult<()> {
        let mut entries = Vec::new();
        for entry_result in dir
            .read_dir(".")
            .map_err(|err| SanitizeError::io(base, err))?
        {
            let entry = entry_result.map_err(|err| SanitizeError::io(base, err))?;
            let name = match entry.file_name() {
                Ok(name) => name,
                Err(err) => {
                    tracing::debug!(directory = %base, error = %err, "skipping non-UTF-8 entry");
                    continue;
                }
            };
            let file_type = entry
                .file_type()
                .map_err(|err| SanitizeError::io(base.join(&name), err))?;
            entries.push((name, file_type));
        }
        entries.sort_by(|(left, _), (right, _)| left.cmp(right));

        for (name, file_type) in entries {
            let path = base.join(&name);
            if file_type.is_dir() {
                let subdir = dir
                    .open_dir(&name)
                    .map_err(|err| SanitizeError::io(path.clone(), err))?;
                self.collect_matches(&subdir, &path, group)?;
            } else if let Some(pattern) = self.matching_pattern(&name) {
                // Linked files count; linked directories are never descended.
                if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                    tracing::trace!(%path, pattern, "found document");
                    group.push(pattern, path);
                }
            }
        }
        Ok(())
    }

    fn matching_pattern(&self, file_name: &str) -> Option<&str> {
        let stem = file_name.strip_suffix(YAML_EXTENSION)?;
        self.patterns
            .iter()
            .map(String::as_str)
            .find(|pattern| *pattern == stem)
    }
}

fn resolve_location(root: &Utf8Path, location: &Utf8Path) -> Option<Utf8PathBuf> {
    let candidate = anchor(root, location);
    match candidate.canonicalize_utf8() {
        Ok(resolved) if resolved.is_dir() => Some(resolved),
        Ok(resolved) => {
            tracing::warn!(location = %resolved, "skipping location that is not a directory");
            None
        }
        Err(err) => {
            tracing::debug!(location = %candidate, error = %err, "skipping missing location");
            None
        }
    }
}
