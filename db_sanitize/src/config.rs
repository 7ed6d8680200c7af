//! Merge configuration loading and validation.
//!
//! The merge pipeline is configured with three keys: `files` (base-name
//! patterns), `locations` (directories to scan) and `output-dir`. They are
//! read from a standalone JSON file or from the `extra.merge-yaml` table of a
//! composer manifest, with `MERGE_YAML_*` environment variables layered on
//! top. [`MergeSettings`] is the validated, immutable form handed to the
//! pipeline.

use camino::{Utf8Path, Utf8PathBuf};
use figment::{
    Figment,
    providers::{Env, Format, Json},
};
use serde::{Deserialize, Serialize};

use crate::error::{SanitizeError, SanitizeResult};

/// Prefix for environment variables overriding merge configuration keys.
pub const ENV_PREFIX: &str = "MERGE_YAML_";

/// Key of the merge configuration table inside a composer manifest.
pub const COMPOSER_KEY: &str = "extra.merge-yaml";

/// Raw merge configuration as written by users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MergeYamlConfig {
    /// Base names (without `.yml`) of the documents to merge.
    #[serde(default)]
    pub files: Vec<String>,
    /// Directories scanned recursively for matching documents.
    #[serde(default)]
    pub locations: Vec<Utf8PathBuf>,
    /// Directory receiving the `<pattern>.merge.yml` files.
    #[serde(default)]
    pub output_dir: Option<Utf8PathBuf>,
}

impl MergeYamlConfig {
    /// Loads configuration from a standalone JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::NotFound`] when `path` does not exist and
    /// [`SanitizeError::Config`] when the JSON cannot be deserialised.
    pub fn from_json_file(path: &Utf8Path) -> SanitizeResult<Self> {
        ensure_exists(path)?;
        Self::extract(Figment::from(Json::file(path)))
    }

    /// Loads configuration from the `extra.merge-yaml` table of a composer
    /// manifest.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::NotFound`] when the manifest does not exist
    /// and [`SanitizeError::Config`] when it cannot be deserialised.
    pub fn from_composer_manifest(path: &Utf8Path) -> SanitizeResult<Self> {
        ensure_exists(path)?;
        Self::extract(Figment::from(Json::file(path)).focus(COMPOSER_KEY))
    }

    fn extract(figment: Figment) -> SanitizeResult<Self> {
        let layered = figment.merge(
            Env::prefixed(ENV_PREFIX).map(|key| key.as_str().replace('_', "-").into()),
        );
        Ok(layered.extract()?)
    }
}

fn ensure_exists(path: &Utf8Path) -> SanitizeResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SanitizeError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Validated merge configuration.
///
/// Relative locations and output directories are interpreted against
/// `project_root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSettings {
    project_root: Utf8PathBuf,
    patterns: Vec<String>,
    locations: Vec<Utf8PathBuf>,
    output_dir: Utf8PathBuf,
}

impl MergeSettings {
    /// Validates `config`, anchoring relative paths at `project_root`.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::MissingConfig`] naming the first of `files`,
    /// `locations` or `output-dir` that is absent or empty.
    pub fn new(
        project_root: impl Into<Utf8PathBuf>,
        config: MergeYamlConfig,
    ) -> SanitizeResult<Self> {
        let project_root = project_root.into();
        let patterns: Vec<String> = config
            .files
            .into_iter()
            .filter(|pattern| !pattern.trim().is_empty())
            .collect();
        if patterns.is_empty() {
            return Err(SanitizeError::MissingConfig { key: "files" });
        }
        if config.locations.is_empty() {
            return Err(SanitizeError::MissingConfig { key: "locations" });
        }
        let output_dir = config
            .output_dir
            .filter(|dir| !dir.as_str().trim().is_empty())
            .ok_or(SanitizeError::MissingConfig { key: "output-dir" })?;
        let output_dir = anchor(&project_root, &output_dir);

        Ok(Self {
            project_root,
            patterns,
            locations: config.locations,
            output_dir,
        })
    }

    /// Directory that relative locations are resolved against.
    #[must_use]
    pub fn project_root(&self) -> &Utf8Path {
        &self.project_root
    }

    /// Configured base-name patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Configured locations as written, before resolution.
    #[must_use]
    pub fn locations(&self) -> &[Utf8PathBuf] {
        &self.locations
    }

    /// Absolute output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }
}

/// Joins `path` onto `root` unless it is already absolute.
pub(crate) fn anchor(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
