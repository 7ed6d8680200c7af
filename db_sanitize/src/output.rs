//! Writers for `<pattern>.merge.yml` files.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};

use crate::error::{SanitizeError, SanitizeResult};

/// Suffix appended to a pattern to form its output file name.
pub const MERGE_SUFFIX: &str = ".merge.yml";

/// Persists merged documents under a fixed output directory.
#[derive(Debug, Clone)]
pub struct MergeOutputWriter {
    output_dir: Utf8PathBuf,
}

impl MergeOutputWriter {
    /// Creates a writer targeting `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory receiving merge files.
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Path the merge file for `pattern` is written to.
    #[must_use]
    pub fn output_path(&self, pattern: &str) -> Utf8PathBuf {
        self.output_dir.join(file_name(pattern))
    }

    /// Ensures the output directory exists, creating it owner-only when
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::OutputDirectory`] when the directory is
    /// missing and cannot be created or opened.
    pub fn prepare(&self) -> SanitizeResult<Dir> {
        ensure_dir(&self.output_dir)
    }

    /// Writes `contents` to `<output_dir>/<pattern>.merge.yml`, replacing any
    /// previous file.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::OutputDirectory`] when the directory cannot be
    /// prepared and [`SanitizeError::Io`] when the file cannot be written.
    pub fn write(&self, pattern: &str, contents: &str) -> SanitizeResult<Utf8PathBuf> {
        let dir = self.prepare()?;
        let name = file_name(pattern);
        let path = self.output_dir.join(&name);
        let mut file = dir
            .open_with(
                &name,
                OpenOptions::new().write(true).create(true).truncate(true),
            )
            .map_err(|err| SanitizeError::io(path.clone(), err))?;
        file.write_all(contents.as_bytes())
            .map_err(|err| SanitizeError::io(path.clone(), err))?;
        Ok(path)
    }
}

fn file_name(pattern: &str) -> String {
    format!("{pattern}{MERGE_SUFFIX}")
}

fn ensure_dir(path: &Utf8Path) -> SanitizeResult<Dir> {
    let output_error = |source: std::io::Error| SanitizeError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    };
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(dir),
        Err(open_err) if open_err.kind() == std::io::ErrorKind::NotFound => {
            create_private_dir(path).map_err(output_error)?;
            tracing::debug!(%path, "created output directory");
            Dir::open_ambient_dir(path, ambient_authority()).map_err(output_error)
        }
        Err(open_err) => Err(output_error(open_err)),
    }
}

fn create_private_dir(path: &Utf8Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, ensure};
    use rstest::rstest;
    use test_helpers::tree::SourceTree;

    #[rstest]
    fn creates_missing_output_directory() -> Result<()> {
        let tree = SourceTree::new()?;
        let writer = MergeOutputWriter::new(tree.path("build/merged"));
        let written = writer.write("database.sanitize", "sanitize: {}\n")?;

        ensure!(written == tree.path("build/merged/database.sanitize.merge.yml"));
        ensure!(std::fs::read_to_string(&written)? == "sanitize: {}\n");
        Ok(())
    }

    #[cfg(unix)]
    #[rstest]
    fn created_directory_is_owner_only() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let tree = SourceTree::new()?;
        let writer = MergeOutputWriter::new(tree.path("private"));
        writer.prepare()?;
        let mode = std::fs::metadata(tree.path("private"))?.permissions().mode();
        ensure!(mode & 0o077 == 0, "group/other bits set: {mode:o}");
        Ok(())
    }

    #[rstest]
    fn overwrites_previous_output() -> Result<()> {
        let tree = SourceTree::new()?;
        let writer = MergeOutputWriter::new(tree.root());
        writer.write("test", "first: a much longer document body\n")?;
        let written = writer.write("test", "second: 2\n")?;

        ensure!(std::fs::read_to_string(written)? == "second: 2\n");
        Ok(())
    }

    #[rstest]
    fn uncreatable_directory_is_reported() -> Result<()> {
        let tree = SourceTree::new()?;
        let blocker = tree.write("blocker", "not a directory")?;
        let writer = MergeOutputWriter::new(blocker.join("merged"));

        let err = writer.prepare().expect_err("directory beneath a file");
        ensure!(
            matches!(err, SanitizeError::OutputDirectory { .. }),
            "unexpected error: {err}"
        );
        Ok(())
    }
}
