//! Loading merge configuration from JSON files, composer manifests and the
//! environment.

use camino::{Utf8Path, Utf8PathBuf};
use db_sanitize::{MergeSettings, MergeYamlConfig, SanitizeError};
use rstest::rstest;
use serde_json::json;

fn jail_root(jail: &figment::Jail) -> figment::error::Result<Utf8PathBuf> {
    Utf8Path::from_path(jail.directory())
        .map(Utf8Path::to_path_buf)
        .ok_or_else(|| figment::Error::from(String::from("jail directory is not UTF-8")))
}

#[rstest]
fn json_file_supplies_every_key() {
    figment::Jail::expect_with(|jail| {
        let config = json!({
            "files": ["database.sanitize"],
            "locations": ["web/modules", "web/profiles"],
            "output-dir": "config/merged",
        });
        jail.create_file("merge.json", &config.to_string())?;

        let loaded = MergeYamlConfig::from_json_file(Utf8Path::new("merge.json"))
            .map_err(<figment::Error as serde::de::Error>::custom)?;
        assert_eq!(loaded.files, ["database.sanitize"]);
        assert_eq!(
            loaded.locations,
            [Utf8PathBuf::from("web/modules"), Utf8PathBuf::from("web/profiles")]
        );
        assert_eq!(loaded.output_dir, Some(Utf8PathBuf::from("config/merged")));
        Ok(())
    });
}

#[rstest]
fn composer_manifest_is_read_from_extra_table() {
    figment::Jail::expect_with(|jail| {
        let manifest = json!({
            "name": "acme/site",
            "require": {"php": ">=8.1"},
            "extra": {
                "merge-yaml": {
                    "files": ["database.sanitize"],
                    "locations": ["web/modules"],
                    "output-dir": "build",
                },
            },
        });
        jail.create_file("composer.json", &manifest.to_string())?;

        let loaded = MergeYamlConfig::from_composer_manifest(Utf8Path::new("composer.json"))
            .map_err(<figment::Error as serde::de::Error>::custom)?;
        let settings = MergeSettings::new(jail_root(jail)?, loaded)
            .map_err(<figment::Error as serde::de::Error>::custom)?;
        assert_eq!(settings.patterns(), ["database.sanitize"]);
        assert_eq!(settings.output_dir(), jail_root(jail)?.join("build"));
        Ok(())
    });
}

#[rstest]
fn environment_overrides_output_dir() {
    figment::Jail::expect_with(|jail| {
        let config = json!({
            "files": ["database.sanitize"],
            "locations": ["web/modules"],
            "output-dir": "build",
        });
        jail.create_file("merge.json", &config.to_string())?;
        jail.set_env("MERGE_YAML_OUTPUT_DIR", "/var/merged");

        let loaded = MergeYamlConfig::from_json_file(Utf8Path::new("merge.json"))
            .map_err(<figment::Error as serde::de::Error>::custom)?;
        assert_eq!(loaded.output_dir, Some(Utf8PathBuf::from("/var/merged")));
        assert_eq!(loaded.files, ["database.sanitize"]);
        Ok(())
    });
}

#[rstest]
fn composer_without_merge_table_lacks_files() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("composer.json", r#"{"name": "acme/site", "extra": {}}"#)?;

        let loaded = MergeYamlConfig::from_composer_manifest(Utf8Path::new("composer.json"))
            .map_err(<figment::Error as serde::de::Error>::custom)?;
        assert_eq!(loaded, MergeYamlConfig::default());
        let err = MergeSettings::new(jail_root(jail)?, loaded)
            .expect_err("empty configuration must be rejected");
        assert!(
            matches!(err, SanitizeError::MissingConfig { key: "files" }),
            "unexpected error: {err}"
        );
        Ok(())
    });
}

#[rstest]
fn malformed_json_is_a_config_error() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("merge.json", r#"{"files": "database.sanitize", "#)?;

        let err = MergeYamlConfig::from_json_file(Utf8Path::new("merge.json"))
            .expect_err("malformed JSON");
        assert!(matches!(err, SanitizeError::Config(_)), "unexpected error: {err}");
        Ok(())
    });
}
