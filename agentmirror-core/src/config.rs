//! Sync configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.agentmirror/
//!   config.yaml   (optional: built-in defaults apply when absent)
//! ```
//!
//! ```yaml
//! source_root: ~/dotfiles
//! base_file: ROOT_AGENTS.md
//! legacy_prefix: ROOT_AGENTS
//! categories: [commands, skills, agents]
//! targets:
//!   - { path: ~/.claude, name: Claude, base_file: CLAUDE.md, import_source: true }
//!   - { path: ~/.gemini, name: Gemini, base_file: GEMINI.md }
//! ```
//!
//! Every field is optional; omitted fields fall back to the defaults.
//!
//! # API pattern
//!
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Category, Target};

pub const DEFAULT_BASE_FILE: &str = "ROOT_AGENTS.md";
pub const DEFAULT_LEGACY_PREFIX: &str = "ROOT_AGENTS";
pub const DEFAULT_CATEGORIES: [&str; 3] = ["commands", "skills", "agents"];

/// Fully resolved settings handed to the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Canonical directory all targets mirror.
    pub source_root: PathBuf,
    /// Name of the base file inside `source_root`.
    pub base_file: String,
    /// Prefix of legacy flat-named entries, without the trailing `_`.
    pub legacy_prefix: String,
    pub categories: Vec<Category>,
    /// Processed in this order, one at a time.
    pub targets: Vec<Target>,
}

impl SyncConfig {
    /// Replace the source root (CLI `--source`).
    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = source_root.into();
        self
    }

    pub fn base_file_path(&self) -> PathBuf {
        self.source_root.join(&self.base_file)
    }

    pub fn import_sources(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.import_source)
    }
}

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    source_root: Option<String>,
    base_file: Option<String>,
    legacy_prefix: Option<String>,
    categories: Option<Vec<String>>,
    targets: Option<Vec<TargetEntry>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetEntry {
    path: String,
    name: String,
    base_file: String,
    #[serde(default)]
    import_source: bool,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.agentmirror/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".agentmirror").join("config.yaml")
}

/// Expand a leading `~` against `home`; other paths pass through.
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Built-in configuration rooted at `home`.
pub fn default_at(home: &Path) -> SyncConfig {
    SyncConfig {
        source_root: home.join("dotfiles"),
        base_file: DEFAULT_BASE_FILE.to_string(),
        legacy_prefix: DEFAULT_LEGACY_PREFIX.to_string(),
        categories: DEFAULT_CATEGORIES.iter().map(|c| Category::from(*c)).collect(),
        targets: default_targets(home),
    }
}

fn default_targets(home: &Path) -> Vec<Target> {
    vec![
        Target::new(home.join(".claude"), "Claude", "CLAUDE.md", true),
        Target::new(home.join(".claude-work-a"), "Claude(Work-A)", "CLAUDE.md", false),
        Target::new(home.join(".claude-work-b"), "Claude(Work-B)", "CLAUDE.md", false),
        Target::new(home.join(".claude-work-c"), "Claude(Work-C)", "CLAUDE.md", false),
        Target::new(home.join(".gemini"), "Gemini", "GEMINI.md", false),
        Target::new(home.join(".codex"), "Codex", "AGENTS.md", true),
    ]
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load `<home>/.agentmirror/config.yaml`, or the defaults if it is absent.
pub fn load_at(home: &Path) -> Result<SyncConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(default_at(home));
    }
    load_from(&path, home)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<SyncConfig, ConfigError> {
    load_at(&home()?)
}

/// Load an explicit config file. Unlike [`load_at`], a missing file is an error.
///
/// Returns `ConfigError::Parse` (with path + line context) if malformed YAML and
/// `ConfigError::Invalid` if the values cannot describe a sync setup.
pub fn load_from(path: &Path, home: &Path) -> Result<SyncConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigFile = if contents.trim().is_empty() {
        ConfigFile::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };
    resolve(file, path, home)
}

fn resolve(file: ConfigFile, path: &Path, home: &Path) -> Result<SyncConfig, ConfigError> {
    let mut config = default_at(home);
    let invalid = |reason: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(root) = file.source_root {
        config.source_root = expand_home(&root, home);
    }
    if let Some(base) = file.base_file {
        if !is_plain_name(&base) {
            return Err(invalid(format!("base_file '{base}' must be a plain file name")));
        }
        config.base_file = base;
    }
    if let Some(prefix) = file.legacy_prefix {
        if prefix.is_empty() || prefix.contains('/') {
            return Err(invalid(format!("legacy_prefix '{prefix}' is not usable")));
        }
        config.legacy_prefix = prefix;
    }
    if let Some(categories) = file.categories {
        let mut seen = HashSet::new();
        for c in &categories {
            if !is_plain_name(c) {
                return Err(invalid(format!("category '{c}' must be a single visible directory name")));
            }
            if !seen.insert(c.as_str()) {
                return Err(invalid(format!("category '{c}' listed twice")));
            }
        }
        config.categories = categories.into_iter().map(Category::from).collect();
    }
    if let Some(entries) = file.targets {
        let mut roots = HashSet::new();
        let mut targets = Vec::with_capacity(entries.len());
        for entry in entries {
            if !is_plain_name(&entry.base_file) {
                return Err(invalid(format!(
                    "target '{}': base_file '{}' must be a plain file name",
                    entry.name, entry.base_file
                )));
            }
            let root = expand_home(&entry.path, home);
            if !roots.insert(root.clone()) {
                return Err(invalid(format!("target path {} listed twice", root.display())));
            }
            targets.push(Target::new(root, entry.name, entry.base_file, entry.import_source));
        }
        config.targets = targets;
    }
    Ok(config)
}

/// Non-empty, visible, and free of path separators.
fn is_plain_name(s: &str) -> bool {
    !s.is_empty() && !s.starts_with('.') && !s.contains('/') && !s.contains('\\')
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn expand_home_handles_tilde_forms() {
        let home = Path::new("/home/me");
        assert_eq!(expand_home("~", home), PathBuf::from("/home/me"));
        assert_eq!(expand_home("~/dotfiles", home), PathBuf::from("/home/me/dotfiles"));
        assert_eq!(expand_home("/abs/path", home), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("~other", home), PathBuf::from("~other"));
    }

    #[test]
    fn defaults_when_config_missing() {
        let tmp = TempDir::new().unwrap();
        let config = load_at(tmp.path()).unwrap();
        assert_eq!(config.source_root, tmp.path().join("dotfiles"));
        assert_eq!(config.base_file, "ROOT_AGENTS.md");
        assert_eq!(config.categories.len(), 3);
        assert_eq!(config.import_sources().count(), 2);
    }

    #[test]
    fn with_source_root_overrides_only_root() {
        let tmp = TempDir::new().unwrap();
        let config = default_at(tmp.path()).with_source_root("/elsewhere");
        assert_eq!(config.source_root, PathBuf::from("/elsewhere"));
        assert_eq!(config.base_file_path(), PathBuf::from("/elsewhere/ROOT_AGENTS.md"));
    }

    #[test]
    fn empty_file_means_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = config_path_at(tmp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "").unwrap();
        assert_eq!(load_at(tmp.path()).unwrap(), default_at(tmp.path()));
    }
}
