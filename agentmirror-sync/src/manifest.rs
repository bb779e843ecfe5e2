//! Manifest store: which `(category, name)` pairs the engine distributes.
//!
//! Persists a JSON document at `<source_root>/.sync-manifest.json`:
//!
//! ```json
//! {
//!   "version": 1,
//!   "items": {
//!     "skills": ["a", "b"]
//!   }
//! }
//! ```
//!
//! Names stay in the manifest after their source item is removed. That is
//! what tells "intentionally deleted" apart from "never seen".
//! Writes use the same `.tmp` + rename pattern as item copies.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use agentmirror_core::{Category, SyncConfig};

use crate::error::{io_err, SyncError};
use crate::source::current_names;

pub const MANIFEST_FILE: &str = ".sync-manifest.json";
pub const MANIFEST_VERSION: u32 = 1;

/// In-memory manifest. Name sets are ordered, so serialization is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub items: BTreeMap<String, BTreeSet<String>>,
}

fn default_version() -> u32 {
    MANIFEST_VERSION
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            items: BTreeMap::new(),
        }
    }
}

impl Manifest {
    pub fn names(&self, category: &Category) -> Option<&BTreeSet<String>> {
        self.items.get(category.as_str())
    }

    pub fn contains(&self, category: &Category, name: &str) -> bool {
        self.names(category).is_some_and(|set| set.contains(name))
    }

    /// Returns `true` if the name was not known yet.
    pub fn insert(&mut self, category: &Category, name: impl Into<String>) -> bool {
        self.items
            .entry(category.0.clone())
            .or_default()
            .insert(name.into())
    }

    /// Union `names` into the category set, creating it if needed.
    pub fn absorb<I>(&mut self, category: &Category, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.items.entry(category.0.clone()).or_default().extend(names);
    }

    /// Drop a tombstone so the name counts as never seen. Returns whether it
    /// was present.
    pub fn forget(&mut self, category: &Category, name: &str) -> bool {
        self.items
            .get_mut(category.as_str())
            .is_some_and(|set| set.remove(name))
    }
}

/// `<source_root>/.sync-manifest.json`
pub fn manifest_path_at(source_root: &Path) -> PathBuf {
    source_root.join(MANIFEST_FILE)
}

/// Load the manifest for `config.source_root`.
///
/// When no file exists yet, one is synthesized from what the source currently
/// provides per category, legacy entries included. A file that exists but does
/// not parse is [`SyncError::CorruptManifest`].
pub fn load_at(config: &SyncConfig) -> Result<Manifest, SyncError> {
    let path = manifest_path_at(&config.source_root);
    if !path.exists() {
        return synthesize(config);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_json::from_str(&contents).map_err(|source| SyncError::CorruptManifest { path, source })
}

fn synthesize(config: &SyncConfig) -> Result<Manifest, SyncError> {
    let mut manifest = Manifest::default();
    for category in &config.categories {
        let names = current_names(config, category)?;
        if !names.is_empty() {
            manifest.absorb(category, names);
        }
    }
    tracing::debug!(
        "no manifest at {}; initialised from source ({} categories)",
        config.source_root.display(),
        manifest.items.len()
    );
    Ok(manifest)
}

/// Save the manifest atomically: pretty JSON, sorted names, trailing newline.
pub fn save_at(source_root: &Path, manifest: &Manifest) -> Result<(), SyncError> {
    let path = manifest_path_at(source_root);
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    let tmp = path.with_file_name(format!("{MANIFEST_FILE}.tmp"));
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    tracing::debug!("saved manifest {}", path.display());
    Ok(())
}
