//! Command-line interface definitions for `db-sanitize`.

use camino::Utf8PathBuf;
use clap::{Args as ClapArgs, Parser, Subcommand};

/// Parsed CLI arguments for `db-sanitize`.
#[derive(Debug, Parser)]
#[command(name = "db-sanitize")]
#[command(about = "Merge sanitize YAML files and report database tables they leave unspecified")]
#[command(version)]
pub struct Args {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands exposed by `db-sanitize`.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge every configured pattern into `<output-dir>/<pattern>.merge.yml`.
    Merge(MergeArgs),
    /// Report the live tables not declared in a sanitize document.
    Analyze(AnalyzeArgs),
    /// Print a sanitize fragment declaring every unspecified table.
    Generate(GenerateArgs),
}

/// Where merge configuration is read from.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct ConfigArgs {
    /// JSON file with `files`, `locations` and `output-dir` keys.
    #[arg(long, value_name = "path", conflicts_with = "composer")]
    pub config: Option<Utf8PathBuf>,
    /// Composer manifest whose `extra.merge-yaml` table holds the
    /// configuration (defaults to `<project-root>/composer.json`).
    #[arg(long, value_name = "path")]
    pub composer: Option<Utf8PathBuf>,
    /// Directory relative locations and output directories are resolved
    /// against (defaults to the current directory).
    #[arg(long, value_name = "dir")]
    pub project_root: Option<Utf8PathBuf>,
}

/// Arguments for `db-sanitize merge`.
#[derive(Debug, Clone, ClapArgs)]
pub struct MergeArgs {
    /// Configuration sources.
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Document and table inputs shared by `analyze` and `generate`.
#[derive(Debug, Clone, ClapArgs)]
pub struct DocumentArgs {
    /// Sanitize document to check; when omitted the configured
    /// `database.sanitize` files are merged in memory.
    #[arg(long, value_name = "path")]
    pub file: Option<Utf8PathBuf>,
    /// File listing live tables one per line, or `-` for standard input.
    #[arg(long, value_name = "path|-")]
    pub tables: Utf8PathBuf,
    /// Fail on malformed documents instead of reporting every table.
    #[arg(long = "strict")]
    pub is_strict: bool,
    /// Configuration sources used when `--file` is omitted.
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for `db-sanitize analyze`.
#[derive(Debug, Clone, ClapArgs)]
pub struct AnalyzeArgs {
    /// Document and table inputs.
    #[command(flatten)]
    pub document: DocumentArgs,
    /// Print every unspecified table on standard output.
    #[arg(long = "list")]
    pub should_list: bool,
}

/// Arguments for `db-sanitize generate`.
#[derive(Debug, Clone, ClapArgs)]
pub struct GenerateArgs {
    /// Document and table inputs.
    #[command(flatten)]
    pub document: DocumentArgs,
    /// Owner (module machine name) the generated entries are declared under.
    #[arg(long, value_name = "owner")]
    pub machine_name: String,
    /// Query template; `{table}` is replaced with each table name.
    #[arg(long, value_name = "template")]
    pub query_template: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).expect("arguments should parse")
    }

    #[rstest]
    fn analyze_accepts_stdin_tables() {
        let parsed = parse(&["db-sanitize", "analyze", "--tables", "-", "--list"]);
        let Command::Analyze(args) = parsed.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.document.tables, Utf8PathBuf::from("-"));
        assert!(args.should_list);
        assert!(args.document.file.is_none());
        assert!(!args.document.is_strict);
    }

    #[rstest]
    fn generate_requires_machine_name() {
        let err = Args::try_parse_from(["db-sanitize", "generate", "--tables", "tables.txt"])
            .expect_err("missing --machine-name");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[rstest]
    fn config_and_composer_conflict() {
        let err = Args::try_parse_from([
            "db-sanitize",
            "merge",
            "--config",
            "merge.json",
            "--composer",
            "composer.json",
        ])
        .expect_err("conflicting sources");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[rstest]
    fn generate_collects_every_option() {
        let Command::Generate(args) = parse(&[
            "db-sanitize",
            "generate",
            "--file",
            "database.sanitize.yml",
            "--tables",
            "tables.txt",
            "--machine-name",
            "my_module",
            "--query-template",
            "DELETE FROM {table}",
            "--strict",
        ])
        .command
        else {
            panic!("expected generate");
        };
        assert_eq!(args.machine_name, "my_module");
        assert_eq!(args.query_template.as_deref(), Some("DELETE FROM {table}"));
        assert_eq!(
            args.document.file,
            Some(Utf8PathBuf::from("database.sanitize.yml"))
        );
        assert!(args.document.is_strict);
    }
}
