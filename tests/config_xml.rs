//! Verify XML config is parsed, validated and used without touching user state.

use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

use file_organizer::config::load_config_from_xml_path;
use file_organizer::{CategoryTable, ConfigError, LogLevel};

fn write(dir: &Path, xml: &str) -> std::path::PathBuf {
    let p = dir.join("config.xml");
    fs::write(&p, xml).expect("write config.xml");
    p
}

#[test]
fn reads_config_xml_and_applies_values() {
    let td = tempdir().unwrap();
    let log_file = td.path().join("file_organizer.log");
    let xml = format!(
        r#"
<config>
  <log_level>debug</log_level>
  <log_file>{}</log_file>
  <settle_interval_ms>125</settle_interval_ms>
  <settle_checks>8</settle_checks>
  <in_progress_suffixes>.part .!ut</in_progress_suffixes>
  <categories>
    <category name="Pictures">
      <extension>.jpg</extension>
      <extension>PNG</extension>
    </category>
    <category name="Code">
      <extension>.rs</extension>
    </category>
  </categories>
</config>
"#,
        log_file.display()
    );
    let cfg = load_config_from_xml_path(&write(td.path(), &xml)).expect("load config");

    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.log_file.as_deref(), Some(log_file.as_path()));
    assert_eq!(cfg.settle.interval, Duration::from_millis(125));
    assert_eq!(cfg.settle.checks, 8);
    assert_eq!(cfg.in_progress_suffixes, vec![".part", ".!ut"]);
    assert_eq!(cfg.categories.resolve(".png"), "Pictures");
    assert_eq!(cfg.categories.resolve("RS"), "Code");
    assert_eq!(cfg.categories.resolve(".pdf"), "Others");
    assert_eq!(cfg.categories.categories(), vec!["Code", "Pictures"]);
}

#[test]
fn missing_sections_keep_builtin_defaults() {
    let td = tempdir().unwrap();
    let cfg = load_config_from_xml_path(&write(td.path(), "<config>\n</config>")).unwrap();
    assert_eq!(cfg.log_level, LogLevel::Normal);
    assert_eq!(cfg.categories, CategoryTable::default());
}

#[test]
fn malformed_xml_is_rejected() {
    let td = tempdir().unwrap();
    let err = load_config_from_xml_path(&write(td.path(), "<config><log_level>normal</config>"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }), "got {err:?}");
}

#[test]
fn unknown_field_is_rejected() {
    let td = tempdir().unwrap();
    let err = load_config_from_xml_path(&write(
        td.path(),
        "<config><download_base>/tmp</download_base></config>",
    ))
    .unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }), "got {err:?}");
    assert!(err.to_string().contains("download_base"), "{err}");
}

#[test]
fn bad_number_is_rejected() {
    let td = tempdir().unwrap();
    let err = load_config_from_xml_path(&write(
        td.path(),
        "<config><settle_checks>lots</settle_checks></config>",
    ))
    .unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }), "got {err:?}");
}

#[test]
fn unknown_log_level_is_rejected() {
    let td = tempdir().unwrap();
    let err = load_config_from_xml_path(&write(td.path(), "<config><log_level>loud</log_level></config>"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }), "got {err:?}");
}

#[test]
fn category_name_with_separator_is_rejected() {
    let td = tempdir().unwrap();
    let err = load_config_from_xml_path(&write(
        td.path(),
        r#"<config><categories><category name="../escape"><extension>.x</extension></category></categories></config>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidCategory { .. }), "got {err:?}");
}

#[test]
fn extension_claimed_twice_is_rejected() {
    let td = tempdir().unwrap();
    let err = load_config_from_xml_path(&write(
        td.path(),
        r#"<config><categories>
             <category name="A"><extension>.dat</extension></category>
             <category name="B"><extension>DAT</extension></category>
           </categories></config>"#,
    ))
    .unwrap_err();
    match err {
        ConfigError::ConflictingExtension { extension, first, second } => {
            assert_eq!(extension, ".dat");
            assert_eq!((first.as_str(), second.as_str()), ("A", "B"));
        }
        other => panic!("expected ConflictingExtension, got {other:?}"),
    }
}

#[test]
fn extension_with_whitespace_is_rejected() {
    let td = tempdir().unwrap();
    let err = load_config_from_xml_path(&write(
        td.path(),
        r#"<config><categories><category name="A"><extension>.t xt</extension></category></categories></config>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidExtension { .. }), "got {err:?}");
}

#[test]
fn missing_file_is_not_found() {
    let td = tempdir().unwrap();
    let err = load_config_from_xml_path(&td.path().join("absent.xml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}
