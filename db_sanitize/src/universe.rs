//! Sources of live entry names (database tables) to reconcile against.

use std::io::{BufRead, BufReader, Read};

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{SanitizeError, SanitizeResult};

/// Collaborator enumerating the live entries that must be covered.
pub trait LiveUniverse {
    /// Returns the live entry names in their natural order.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::Universe`] when the names cannot be
    /// enumerated.
    fn entries(&self) -> SanitizeResult<Vec<String>>;
}

impl LiveUniverse for Vec<String> {
    fn entries(&self) -> SanitizeResult<Vec<String>> {
        Ok(self.clone())
    }
}

impl LiveUniverse for [&str] {
    fn entries(&self) -> SanitizeResult<Vec<String>> {
        Ok(self.iter().map(|name| (*name).to_owned()).collect())
    }
}

impl<const N: usize> LiveUniverse for [&str; N] {
    fn entries(&self) -> SanitizeResult<Vec<String>> {
        self.as_slice().entries()
    }
}

impl<U: LiveUniverse + ?Sized> LiveUniverse for &U {
    fn entries(&self) -> SanitizeResult<Vec<String>> {
        (**self).entries()
    }
}

/// Table names listed one per line, as produced by `SHOW TABLES`.
///
/// Blank lines and lines starting with `#` are ignored; surrounding
/// whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableList {
    /// Read the list from a file.
    File(Utf8PathBuf),
    /// Read the list from standard input.
    Stdin,
}

impl TableList {
    /// Interprets `-` as standard input and anything else as a file path.
    #[must_use]
    pub fn from_arg(arg: &Utf8Path) -> Self {
        if arg.as_str() == "-" {
            Self::Stdin
        } else {
            Self::File(arg.to_path_buf())
        }
    }

    fn origin(&self) -> String {
        match self {
            Self::File(path) => path.to_string(),
            Self::Stdin => "standard input".to_owned(),
        }
    }
}

impl LiveUniverse for TableList {
    fn entries(&self) -> SanitizeResult<Vec<String>> {
        let result = match self {
            Self::File(path) => std::fs::File::open(path).and_then(read_table_names),
            Self::Stdin => read_table_names(std::io::stdin().lock()),
        };
        result.map_err(|source| SanitizeError::Universe {
            origin: self.origin(),
            source,
        })
    }
}

/// Reads table names from `reader`, one per line.
///
/// # Errors
///
/// Returns any I/O error raised while reading.
pub fn read_table_names<R: Read>(reader: R) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        let name = line.trim();
        if name.is_empty() || name.starts_with('#') {
            continue;
        }
        names.push(name.to_owned());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, ensure};
    use rstest::rstest;
    use test_helpers::tree::SourceTree;

    #[rstest]
    fn table_names_skip_blanks_and_comments() -> Result<()> {
        let input = "# SHOW TABLES\nusers\n\n  node  \n#cache\ncache\n";
        let names = read_table_names(input.as_bytes())?;
        ensure!(names == ["users", "node", "cache"], "unexpected names: {names:?}");
        Ok(())
    }

    #[rstest]
    fn table_list_file_is_read() -> Result<()> {
        let tree = SourceTree::new()?;
        let path = tree.write("tables.txt", "users\nnode\n")?;
        ensure!(TableList::File(path).entries()? == ["users", "node"]);
        Ok(())
    }

    #[rstest]
    fn missing_table_list_names_its_origin() {
        let list = TableList::File(Utf8PathBuf::from("/nonexistent/tables.txt"));
        let err = list.entries().expect_err("missing file");
        assert!(matches!(err, SanitizeError::Universe { .. }));
        assert!(err.to_string().contains("/nonexistent/tables.txt"));
    }

    #[rstest]
    #[case("-", TableList::Stdin)]
    #[case("tables.txt", TableList::File(Utf8PathBuf::from("tables.txt")))]
    fn dash_selects_standard_input(#[case] arg: &str, #[case] expected: TableList) {
        assert_eq!(TableList::from_arg(Utf8Path::new(arg)), expected);
    }

    #[rstest]
    fn arrays_and_vectors_are_universes() -> Result<()> {
        ensure!(["a", "b"].entries()? == ["a", "b"]);
        ensure!(vec!["c".to_owned()].entries()? == ["c"]);
        Ok(())
    }
}
