//! Synthesis of sanitize fragments for unspecified tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SanitizeError, SanitizeResult};
use crate::reconcile::UnspecifiedSet;

/// Placeholder substituted with the table name in query templates.
pub const TABLE_PLACEHOLDER: &str = "{table}";

/// Declared sanitisation for a single table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntryDefinition {
    /// Human-readable explanation of the table's contents.
    pub description: String,
    /// Statement run to sanitise the table.
    pub query: String,
}

/// Serialisable `sanitize → owner → table → definition` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SanitizeDocument {
    /// Owners and the tables they declare.
    pub sanitize: BTreeMap<String, BTreeMap<String, EntryDefinition>>,
}

/// Query template with a `{table}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate(String);

impl QueryTemplate {
    /// Wraps a custom template.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Renders the query for `table`.
    #[must_use]
    pub fn render(&self, table: &str) -> String {
        self.0.replace(TABLE_PLACEHOLDER, table)
    }
}

impl Default for QueryTemplate {
    fn default() -> Self {
        Self::new("TRUNCATE TABLE {table}")
    }
}

/// Result of generating a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Every live table is already specified; nothing was generated.
    FullySpecified,
    /// YAML fragment declaring the unspecified tables.
    Fragment(String),
}

/// Builds the document declaring every `missing` table under `owner`.
#[must_use]
pub fn build_document(
    owner: &str,
    missing: &UnspecifiedSet,
    template: &QueryTemplate,
) -> SanitizeDocument {
    let tables = missing
        .iter()
        .map(|table| {
            let definition = EntryDefinition {
                description: String::new(),
                query: template.render(table),
            };
            (table.to_owned(), definition)
        })
        .collect();
    SanitizeDocument {
        sanitize: BTreeMap::from([(owner.to_owned(), tables)]),
    }
}

/// Serialises a fragment for `missing`, or reports that nothing is missing.
///
/// # Errors
///
/// Returns [`SanitizeError::Serialize`] when emission fails.
pub fn generate_fragment(
    owner: &str,
    missing: &UnspecifiedSet,
    template: &QueryTemplate,
) -> SanitizeResult<GenerateOutcome> {
    if missing.is_empty() {
        return Ok(GenerateOutcome::FullySpecified);
    }
    let document = build_document(owner, missing, template);
    serde_yaml::to_string(&document)
        .map(GenerateOutcome::Fragment)
        .map_err(SanitizeError::Serialize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergedDocument;
    use crate::reconcile::{DocumentSource, SpecificationReconciler};
    use rstest::rstest;

    fn missing(names: &[&str]) -> UnspecifiedSet {
        let universe: Vec<String> = names.iter().map(|n| (*n).to_owned()).collect();
        SpecificationReconciler::default()
            .unspecified(&DocumentSource::Merged(MergedDocument::default()), &universe)
            .expect("empty document reconciles")
    }

    #[rstest]
    fn default_template_truncates() {
        assert_eq!(QueryTemplate::default().render("users"), "TRUNCATE TABLE users");
    }

    #[rstest]
    fn custom_template_substitutes_every_placeholder() {
        let template = QueryTemplate::new("DELETE FROM {table}; OPTIMIZE TABLE {table}");
        assert_eq!(
            template.render("cache"),
            "DELETE FROM cache; OPTIMIZE TABLE cache"
        );
    }

    #[rstest]
    fn nothing_missing_is_fully_specified() {
        let outcome =
            generate_fragment("owner", &missing(&[]), &QueryTemplate::default()).expect("generate");
        assert_eq!(outcome, GenerateOutcome::FullySpecified);
    }

    #[rstest]
    fn fragment_declares_every_missing_table() {
        let outcome = generate_fragment(
            "my_module",
            &missing(&["users", "cache"]),
            &QueryTemplate::default(),
        )
        .expect("generate");
        let GenerateOutcome::Fragment(text) = outcome else {
            panic!("expected a fragment");
        };
        assert_eq!(
            text,
            concat!(
                "sanitize:\n",
                "  my_module:\n",
                "    cache:\n",
                "      description: ''\n",
                "      query: TRUNCATE TABLE cache\n",
                "    users:\n",
                "      description: ''\n",
                "      query: TRUNCATE TABLE users\n",
            )
        );
        let parsed: SanitizeDocument = serde_yaml::from_str(&text).expect("fragment parses");
        assert_eq!(parsed.sanitize["my_module"].len(), 2);
    }
}
