//! Config file lookup order: --config, then FILE_ORGANIZER_CONFIG, then the default path.

use serial_test::serial;
use std::fs;
use tempfile::tempdir;

use file_organizer::config::{CONFIG_ENV_VAR, load_config};
use file_organizer::{ConfigError, LogLevel, default_config_path};

struct EnvGuard;

impl EnvGuard {
    fn set(value: &std::path::Path) -> Self {
        unsafe {
            std::env::set_var(CONFIG_ENV_VAR, value);
        }
        EnvGuard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            std::env::remove_var(CONFIG_ENV_VAR);
        }
    }
}

#[test]
#[serial]
fn env_var_names_the_config_file() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("custom.xml");
    fs::write(&cfg_path, "<config><log_level>quiet</log_level></config>").unwrap();
    let _env = EnvGuard::set(&cfg_path);

    assert_eq!(default_config_path(), Some(cfg_path.clone()));
    let (cfg, source) = load_config(None).unwrap();
    assert_eq!(source, Some(cfg_path));
    assert_eq!(cfg.log_level, LogLevel::Quiet);
}

#[test]
#[serial]
fn explicit_path_wins_over_env() {
    let td = tempdir().unwrap();
    let env_cfg = td.path().join("env.xml");
    let flag_cfg = td.path().join("flag.xml");
    fs::write(&env_cfg, "<config><log_level>quiet</log_level></config>").unwrap();
    fs::write(&flag_cfg, "<config><log_level>info</log_level></config>").unwrap();
    let _env = EnvGuard::set(&env_cfg);

    let (cfg, source) = load_config(Some(&flag_cfg)).unwrap();
    assert_eq!(source.as_deref(), Some(flag_cfg.as_path()));
    assert_eq!(cfg.log_level, LogLevel::Info);
}

#[test]
#[serial]
fn env_var_pointing_nowhere_is_an_error() {
    let td = tempdir().unwrap();
    let _env = EnvGuard::set(&td.path().join("missing.xml"));

    let err = load_config(None).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)), "got {err:?}");
}

#[test]
#[serial]
fn explicit_missing_path_is_an_error() {
    let td = tempdir().unwrap();
    let err = load_config(Some(&td.path().join("missing.xml"))).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)), "got {err:?}");
}
