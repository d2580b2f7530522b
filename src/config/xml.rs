//! XML configuration support.
//! - Loads settings and the category table from config.xml (quick_xml).
//! - Writes a commented template on request.
//!
//! Unknown XML fields are rejected so misspelled settings never pass silently.

use anyhow::{Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::CONFIG_ENV_VAR;
use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};

use crate::category::{CategoryTable, DEFAULT_CATEGORIES};
use crate::errors::ConfigError;
use crate::organize::COMMON_IN_PROGRESS_SUFFIXES;
use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600};
use crate::utils::SettleWindow;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    settle_interval_ms: Option<u64>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    settle_checks: Option<u64>,
    in_progress_suffixes: Option<String>,
    categories: Option<XmlCategories>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlCategories {
    #[serde(rename = "category", default)]
    entries: Vec<XmlCategory>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlCategory {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "extension", default)]
    extensions: Vec<String>,
}

// Numbers may be padded with whitespace by hand-edited files; anything else is an error.
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    opt.map(|s| {
        s.trim()
            .parse::<u64>()
            .map_err(|e| serde::de::Error::custom(format!("expected a whole number, got '{}': {e}", s.trim())))
    })
    .transpose()
}

fn malformed(path: &Path, reason: impl Into<String>) -> ConfigError {
    ConfigError::Malformed {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

// Map XmlConfig -> Config, validating as we go.
fn xml_to_config(path: &Path, parsed: XmlConfig) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Some(s) = parsed.log_level.as_deref() {
        cfg.log_level = s.parse::<LogLevel>().map_err(|e| malformed(path, e))?;
    }

    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_file = Some(PathBuf::from(trimmed));
        }
    }

    if let Some(ms) = parsed.settle_interval_ms {
        if ms == 0 {
            return Err(malformed(path, "settle_interval_ms must be greater than zero"));
        }
        cfg.settle.interval = Duration::from_millis(ms);
    }
    if let Some(n) = parsed.settle_checks {
        let checks = u32::try_from(n)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| malformed(path, format!("settle_checks must be between 1 and {}", u32::MAX)))?;
        cfg.settle.checks = checks;
    }

    // "none" disables the in-progress filter; an empty element is treated the same.
    if let Some(s) = parsed.in_progress_suffixes.as_deref() {
        cfg.in_progress_suffixes = if s.trim().eq_ignore_ascii_case("none") {
            Vec::new()
        } else {
            s.split_whitespace().map(str::to_string).collect()
        };
    }

    if let Some(categories) = parsed.categories {
        cfg.categories = CategoryTable::from_groups(
            categories
                .entries
                .into_iter()
                .map(|c| (c.name, c.extensions)),
        )?;
    }

    Ok(cfg)
}

/// Load a Config from a specific XML file path (quick_xml).
pub fn load_config_from_xml_path(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let parsed: XmlConfig = from_xml_str(&contents).map_err(|e| malformed(path, e.to_string()))?;
    let cfg = xml_to_config(path, parsed)?;
    debug!(
        path = %path.display(),
        categories = cfg.categories.categories().len(),
        "Loaded config"
    );
    Ok(cfg)
}

/// Resolve and load the active configuration.
///
/// Lookup order: `explicit`, then `$FILE_ORGANIZER_CONFIG`, then the platform
/// default. Returns the config and the file it came from, or `None` when the
/// default file does not exist and built-in settings are used.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>), ConfigError> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()).map(PathBuf::from));

    if let Some(path) = named {
        let cfg = load_config_from_xml_path(&path)?;
        return Ok((cfg, Some(path)));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            let cfg = load_config_from_xml_path(&path)?;
            Ok((cfg, Some(path)))
        }
        _ => Ok((Config::default(), None)),
    }
}

fn template_body() -> String {
    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "/path/to/file_organizer.log".into());
    let settle = SettleWindow::default();

    let mut categories = String::new();
    for (name, extensions) in DEFAULT_CATEGORIES {
        let _ = writeln!(categories, "    <category name=\"{name}\">");
        for ext in *extensions {
            let _ = writeln!(categories, "      <extension>{ext}</extension>");
        }
        categories.push_str("    </category>\n");
    }

    format!(
        "<!--\n  file_organizer configuration (XML)\n\n  Fields:\n    log_level             -> quiet | normal | info | debug\n    log_file              -> path to log file (console output is always kept)\n    settle_interval_ms    -> watch mode: delay between size checks of a new file\n    settle_checks         -> watch mode: size checks per probe of a growing file\n    in_progress_suffixes  -> space separated; files ending in these are left alone (\"none\" disables)\n                             e.g. {}\n    categories            -> replaces the built-in table; extensions not listed go to \"Others\"\n\n  Notes:\n    - CLI flags override XML values.\n    - Extension matching is case-insensitive; the leading dot is optional.\n-->\n<config>\n  <log_level>normal</log_level>\n  <log_file>{suggested_log}</log_file>\n  <settle_interval_ms>{}</settle_interval_ms>\n  <settle_checks>{}</settle_checks>\n  <in_progress_suffixes>none</in_progress_suffixes>\n  <categories>\n{categories}  </categories>\n</config>\n",
        COMMON_IN_PROGRESS_SUFFIXES.join(" "),
        settle.interval.as_millis(),
        settle.checks,
    )
}

/// Create a commented template config file and its parent directory.
/// Uses secure creation to avoid following attacker-controlled symlinks on Unix.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        let _ = set_dir_mode_0700(parent);
    }

    write_config_secure_new_0600(path, template_body().as_bytes())?;
    let _ = set_file_mode_0600(path);

    info!(path = %path.display(), "Created template config");
    Ok(())
}
