//! Orchestration of the merge and analysis workflows.

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::MergeSettings;
use crate::error::{SanitizeError, SanitizeResult};
use crate::generate::{GenerateOutcome, QueryTemplate, generate_fragment};
use crate::locate::{DocumentGroup, DocumentLocator};
use crate::merge::{MergedDocument, merge_files};
use crate::output::MergeOutputWriter;
use crate::reconcile::{
    DocumentSource, ParseFailurePolicy, SpecificationReconciler, UnspecifiedSet,
};
use crate::universe::LiveUniverse;

/// Base name of the documents declaring table sanitisation.
pub const DATABASE_SANITIZE_PATTERN: &str = "database.sanitize";

/// A merge file written by [`MergeYaml::create_merge_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedFile {
    /// Pattern the sources matched.
    pub pattern: String,
    /// Source documents in merge order.
    pub sources: Vec<Utf8PathBuf>,
    /// File the merged document was written to.
    pub output: Utf8PathBuf,
}

/// Locates, merges and writes documents for every configured pattern.
#[derive(Debug, Clone)]
pub struct MergeYaml {
    locator: DocumentLocator,
    writer: MergeOutputWriter,
}

impl MergeYaml {
    /// Builds the pipeline from validated settings.
    #[must_use]
    pub fn new(settings: &MergeSettings) -> Self {
        Self {
            locator: DocumentLocator::from_settings(settings),
            writer: MergeOutputWriter::new(settings.output_dir()),
        }
    }

    /// Finds the documents for every pattern.
    ///
    /// # Errors
    ///
    /// Propagates directory read failures.
    pub fn locate(&self) -> SanitizeResult<DocumentGroup> {
        self.locator.locate()
    }

    /// Merges the documents matching `pattern` in memory.
    ///
    /// Returns `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Propagates read and parse failures of any matched document.
    pub fn merged_document(&self, pattern: &str) -> SanitizeResult<Option<MergedDocument>> {
        let group = self.locate()?;
        group.get(pattern).map(merge_files).transpose()
    }

    /// Writes `<output_dir>/<pattern>.merge.yml` for every pattern with
    /// matches.
    ///
    /// The output directory is prepared before discovery, so it exists even
    /// when nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::OutputDirectory`] when the output directory
    /// cannot be created and aborts on the first unreadable or malformed
    /// document.
    pub fn create_merge_files(&self) -> SanitizeResult<Vec<MergedFile>> {
        self.writer.prepare()?;
        let group = self.locate()?;
        if group.is_empty() {
            tracing::info!("no merge files have been created");
            return Ok(Vec::new());
        }

        let mut written = Vec::with_capacity(group.len());
        for (pattern, sources) in group.iter() {
            for source in sources {
                tracing::info!(%source, pattern, "merging");
            }
            let yaml = merge_files(sources)?.to_yaml()?;
            let output = self.writer.write(pattern, &yaml)?;
            tracing::info!(%output, pattern, "merged");
            written.push(MergedFile {
                pattern: pattern.to_owned(),
                sources: sources.to_vec(),
                output,
            });
        }
        Ok(written)
    }
}

/// Unspecified tables reported by [`Sanitizer::analyze`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    /// Tables not declared by any sanitize entry.
    pub unspecified: UnspecifiedSet,
}

impl Analysis {
    /// Number of unspecified tables.
    #[must_use]
    pub fn unspecified_count(&self) -> usize {
        self.unspecified.len()
    }

    /// Returns `true` when every live table is declared.
    #[must_use]
    pub fn is_fully_specified(&self) -> bool {
        self.unspecified.is_empty()
    }
}

/// Compares sanitize documents against the live tables.
#[derive(Debug, Clone)]
pub struct Sanitizer<U> {
    universe: U,
    reconciler: SpecificationReconciler,
    template: QueryTemplate,
}

impl<U: LiveUniverse> Sanitizer<U> {
    /// Creates a sanitizer reading live tables from `universe`.
    #[must_use]
    pub fn new(universe: U) -> Self {
        Self {
            universe,
            reconciler: SpecificationReconciler::default(),
            template: QueryTemplate::default(),
        }
    }

    /// Sets how malformed documents are handled.
    #[must_use]
    pub fn with_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.reconciler = SpecificationReconciler::new(policy);
        self
    }

    /// Sets the query template used by [`Sanitizer::generate`].
    #[must_use]
    pub fn with_query_template(mut self, template: QueryTemplate) -> Self {
        self.template = template;
        self
    }

    /// Reports the live tables not declared in the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::NotFound`] when `path` does not exist, and
    /// propagates universe and reconciliation failures.
    pub fn analyze(&self, path: &Utf8Path) -> SanitizeResult<Analysis> {
        self.analyze_source(&existing(path)?)
    }

    /// Reports the live tables not declared by `source`.
    ///
    /// # Errors
    ///
    /// Propagates universe and reconciliation failures.
    pub fn analyze_source(&self, source: &DocumentSource) -> SanitizeResult<Analysis> {
        let universe = self.universe.entries()?;
        let unspecified = self.reconciler.unspecified(source, &universe)?;
        Ok(Analysis { unspecified })
    }

    /// Generates a fragment declaring every table `path` leaves unspecified
    /// under `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::NotFound`] when `path` does not exist, and
    /// propagates universe, reconciliation and serialisation failures.
    pub fn generate(&self, path: &Utf8Path, owner: &str) -> SanitizeResult<GenerateOutcome> {
        self.generate_source(&existing(path)?, owner)
    }

    /// Generates a fragment for the tables `source` leaves unspecified.
    ///
    /// # Errors
    ///
    /// Propagates universe, reconciliation and serialisation failures.
    pub fn generate_source(
        &self,
        source: &DocumentSource,
        owner: &str,
    ) -> SanitizeResult<GenerateOutcome> {
        let analysis = self.analyze_source(source)?;
        generate_fragment(owner, &analysis.unspecified, &self.template)
    }
}

fn existing(path: &Utf8Path) -> SanitizeResult<DocumentSource> {
    if path.exists() {
        Ok(DocumentSource::Path(path.to_path_buf()))
    } else {
        Err(SanitizeError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, ensure};
    use rstest::rstest;
    use test_helpers::tree::SourceTree;

    #[rstest]
    fn analyze_rejects_missing_document_before_enumerating() {
        struct Unreachable;
        impl LiveUniverse for Unreachable {
            fn entries(&self) -> SanitizeResult<Vec<String>> {
                panic!("universe must not be enumerated for a missing document");
            }
        }

        let err = Sanitizer::new(Unreachable)
            .analyze(Utf8Path::new("/nonexistent/database.sanitize.yml"))
            .expect_err("missing document");
        assert!(err.is_not_found());
    }

    #[rstest]
    fn analysis_counts_unspecified_tables() -> Result<()> {
        let tree = SourceTree::new()?;
        let doc = tree.write(
            "database.sanitize.yml",
            "sanitize: {core: {users: {description: '', query: ''}}}\n",
        )?;

        let analysis = Sanitizer::new(["users", "cache", "sessions"]).analyze(&doc)?;
        ensure!(analysis.unspecified_count() == 2);
        ensure!(!analysis.is_fully_specified());
        ensure!(analysis.unspecified.as_slice() == ["cache", "sessions"]);
        Ok(())
    }

    #[rstest]
    fn merged_document_is_none_without_matches() -> Result<()> {
        let tree = SourceTree::new()?;
        tree.write("modules/readme.yml", "a: 1\n")?;
        let settings = MergeSettings::new(
            tree.root(),
            crate::config::MergeYamlConfig {
                files: vec![DATABASE_SANITIZE_PATTERN.to_owned()],
                locations: vec![Utf8PathBuf::from("modules")],
                output_dir: Some(Utf8PathBuf::from("out")),
            },
        )?;
        ensure!(MergeYaml::new(&settings).merged_document(DATABASE_SANITIZE_PATTERN)?.is_none());
        Ok(())
    }
}
