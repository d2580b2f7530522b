//! Extension → category resolution.
//!
//! The table is built once at startup (from the built-in defaults or the XML
//! config) and never mutated afterwards; callers share it behind an `Arc`.
//! Keys are stored lowercase with a leading dot, so `"JPG"`, `".jpg"` and
//! `".JPG"` all resolve the same.

use std::collections::HashMap;
use std::path::Path;

use crate::errors::ConfigError;

/// Category used for every extension the table does not know.
pub const FALLBACK_CATEGORY: &str = "Others";

/// Built-in table used when no `<categories>` element is configured.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Images", &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff"]),
    ("Documents", &[".pdf", ".docx", ".doc", ".txt", ".xlsx", ".pptx", ".csv"]),
    ("Videos", &[".mp4", ".mov", ".avi", ".mkv", ".flv", ".wmv"]),
    ("Audio", &[".mp3", ".wav", ".aac", ".flac", ".ogg"]),
    ("Archives", &[".zip", ".rar", ".tar", ".gz", ".7z"]),
    ("Scripts", &[".py", ".js", ".sh", ".bat", ".rb", ".php"]),
];

// Characters Windows refuses in file names; rejected everywhere so a config
// stays portable.
const RESERVED_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

/// Immutable mapping from lowercase extension (with leading dot) to category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    by_extension: HashMap<String, String>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        let mut by_extension = HashMap::new();
        for (category, extensions) in DEFAULT_CATEGORIES {
            for ext in *extensions {
                by_extension.insert((*ext).to_string(), (*category).to_string());
            }
        }
        Self { by_extension }
    }
}

impl CategoryTable {
    /// Build a validated table from `(category, extensions)` groups.
    ///
    /// Fails on unusable folder names, malformed extensions, or an extension
    /// claimed by two different categories.
    pub fn from_groups<I, C, E, S>(groups: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (C, E)>,
        C: AsRef<str>,
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_extension: HashMap<String, String> = HashMap::new();
        for (category, extensions) in groups {
            let category = category.as_ref().trim();
            validate_category_name(category)?;
            for ext in extensions {
                let key = normalize_config_extension(category, ext.as_ref())?;
                match by_extension.get(&key) {
                    Some(existing) if existing != category => {
                        return Err(ConfigError::ConflictingExtension {
                            extension: key,
                            first: existing.clone(),
                            second: category.to_string(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        by_extension.insert(key, category.to_string());
                    }
                }
            }
        }
        Ok(Self { by_extension })
    }

    /// Map an extension to its category; unknown or empty extensions map to `"Others"`.
    pub fn resolve(&self, extension: &str) -> &str {
        let ext = extension.trim();
        if ext.is_empty() || ext == "." {
            return FALLBACK_CATEGORY;
        }
        let mut key = String::with_capacity(ext.len() + 1);
        if !ext.starts_with('.') {
            key.push('.');
        }
        key.push_str(&ext.to_lowercase());
        self.by_extension
            .get(&key)
            .map(String::as_str)
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// Resolve the category of a path by its final extension.
    pub fn resolve_path(&self, path: &Path) -> &str {
        self.resolve(&extension_of(path))
    }

    /// Distinct category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_extension.values().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Number of known extensions.
    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

/// Final extension of `path` with a leading dot, or an empty string.
/// `archive.tar.gz` yields `.gz`; dotfiles such as `.bashrc` have none.
pub fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy()),
        _ => String::new(),
    }
}

fn validate_category_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidCategory {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name cannot be a relative path component"));
    }
    if name.contains(RESERVED_NAME_CHARS) {
        return Err(invalid("name contains a path separator or reserved character"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid("name contains control characters"));
    }
    if name.ends_with('.') || name.ends_with(' ') {
        return Err(invalid("name cannot end with '.' or a space"));
    }
    Ok(())
}

fn normalize_config_extension(category: &str, raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidExtension {
        category: category.to_string(),
        extension: raw.to_string(),
        reason: reason.to_string(),
    };
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() {
        return Err(invalid("extension is empty"));
    }
    if bare.contains('.') {
        return Err(invalid("only the final extension is matched; drop the inner dots"));
    }
    if bare.contains(RESERVED_NAME_CHARS) || bare.chars().any(char::is_whitespace) {
        return Err(invalid("extension contains whitespace or reserved characters"));
    }
    Ok(format!(".{}", bare.to_lowercase()))
}
