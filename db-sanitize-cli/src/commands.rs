//! Command implementations for `db-sanitize`.
//!
//! Results go to `out` and status messages to `err`, so `analyze --list` and
//! `generate` output can be redirected on its own.

use std::io::Write;

use camino::Utf8PathBuf;
use db_sanitize::{
    Analysis, DATABASE_SANITIZE_PATTERN, DocumentSource, GenerateOutcome, MergeSettings,
    MergeYaml, MergeYamlConfig, MergedDocument, MergedFile, ParseFailurePolicy, QueryTemplate,
    Sanitizer, TableList,
};

use crate::cli::{AnalyzeArgs, ConfigArgs, DocumentArgs, GenerateArgs, MergeArgs};
use crate::error::CliError;

const COMPOSER_MANIFEST: &str = "composer.json";
const REPORT_PREFIX: &str = "> merge-yaml:";
const FULLY_SPECIFIED: &str = "All database tables are already specified in sanitize YML files";

/// Writes every configured merge file and reports what was merged.
pub fn merge(args: &MergeArgs, out: &mut impl Write) -> Result<(), CliError> {
    let settings = load_settings(&args.config)?;
    let written = MergeYaml::new(&settings).create_merge_files()?;
    write_merge_report(out, &written)?;
    Ok(())
}

/// Reports how many live tables are unspecified, listing them on request.
pub fn analyze(
    args: &AnalyzeArgs,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<(), CliError> {
    let sanitizer = build_sanitizer(&args.document);
    let analysis = args.document.file.as_deref().map_or_else(
        || -> Result<Analysis, CliError> {
            Ok(sanitizer.analyze_source(&canonical_source(&args.document.config)?)?)
        },
        |path| Ok(sanitizer.analyze(path)?),
    )?;

    if analysis.is_fully_specified() {
        writeln!(err, "{FULLY_SPECIFIED}")?;
        return Ok(());
    }
    writeln!(
        err,
        "There are {} tables not defined on sanitize YML files",
        analysis.unspecified_count()
    )?;
    if args.should_list {
        for table in analysis.unspecified.iter() {
            writeln!(out, "{table}")?;
        }
    }
    Ok(())
}

/// Prints a fragment declaring every unspecified table under the requested
/// owner.
pub fn generate(
    args: &GenerateArgs,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<(), CliError> {
    let mut sanitizer = build_sanitizer(&args.document);
    if let Some(template) = &args.query_template {
        sanitizer = sanitizer.with_query_template(QueryTemplate::new(template.as_str()));
    }
    let owner = args.machine_name.as_str();
    let outcome = args.document.file.as_deref().map_or_else(
        || -> Result<GenerateOutcome, CliError> {
            Ok(sanitizer.generate_source(&canonical_source(&args.document.config)?, owner)?)
        },
        |path| Ok(sanitizer.generate(path, owner)?),
    )?;

    match outcome {
        GenerateOutcome::FullySpecified => writeln!(err, "{FULLY_SPECIFIED}")?,
        GenerateOutcome::Fragment(yaml) => write!(out, "{yaml}")?,
    }
    Ok(())
}

fn build_sanitizer(args: &DocumentArgs) -> Sanitizer<TableList> {
    let policy = if args.is_strict {
        ParseFailurePolicy::Strict
    } else {
        ParseFailurePolicy::Lenient
    };
    Sanitizer::new(TableList::from_arg(&args.tables)).with_policy(policy)
}

/// Merges the configured `database.sanitize` documents in memory.
fn canonical_source(args: &ConfigArgs) -> Result<DocumentSource, CliError> {
    let settings = load_settings(args)?;
    let merged = MergeYaml::new(&settings).merged_document(DATABASE_SANITIZE_PATTERN)?;
    Ok(DocumentSource::Merged(merged.unwrap_or_else(|| {
        tracing::warn!(
            pattern = DATABASE_SANITIZE_PATTERN,
            "no documents found in the configured locations"
        );
        MergedDocument::default()
    })))
}

fn load_settings(args: &ConfigArgs) -> Result<MergeSettings, CliError> {
    let project_root = args.project_root.clone().map_or_else(current_dir, Ok)?;
    let config = match (&args.config, &args.composer) {
        (Some(path), _) => MergeYamlConfig::from_json_file(path)?,
        (None, Some(path)) => MergeYamlConfig::from_composer_manifest(path)?,
        (None, None) => {
            MergeYamlConfig::from_composer_manifest(&project_root.join(COMPOSER_MANIFEST))?
        }
    };
    Ok(MergeSettings::new(project_root, config)?)
}

fn current_dir() -> Result<Utf8PathBuf, CliError> {
    let dir = std::env::current_dir().map_err(CliError::CurrentDir)?;
    Utf8PathBuf::from_path_buf(dir).map_err(CliError::NonUtf8CurrentDir)
}

fn write_merge_report(out: &mut impl Write, written: &[MergedFile]) -> std::io::Result<()> {
    if written.is_empty() {
        return writeln!(out, "{REPORT_PREFIX} No merge files have been created");
    }
    for file in written {
        for source in &file.sources {
            writeln!(out, "{REPORT_PREFIX} Merging {source}")?;
        }
        writeln!(out, "{REPORT_PREFIX} Merged in {}", file.output)?;
    }
    Ok(())
}
