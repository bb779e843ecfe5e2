//! Source aggregation: every unit the source root offers for distribution.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

use agentmirror_core::{Category, SyncConfig};

use crate::error::SyncError;
use crate::fsops::visible_children;
use crate::naming::{is_legacy_name, split_category, to_relative_path};

/// One distributable unit of the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncItem {
    /// Absolute path inside the source root.
    pub source: PathBuf,
    /// `/`-separated path, identical for every target.
    pub relative_path: String,
    pub is_directory: bool,
}

/// Every child of every category directory plus legacy flat-named entries,
/// sorted by relative path. The base file is planned separately per target
/// because its name differs between targets.
///
/// Category children are separate units so that a target may hold extra,
/// unmanaged children next to them. When a legacy entry and a category child
/// map to the same path, the legacy entry comes first and wins.
pub fn gather(config: &SyncConfig) -> Result<Vec<SyncItem>, SyncError> {
    let root = &config.source_root;
    let mut items = legacy_items(config)?;

    for category in &config.categories {
        for (name, path) in visible_children(&root.join(category.as_str()))? {
            items.push(SyncItem {
                is_directory: path.is_dir(),
                source: path,
                relative_path: format!("{category}/{name}"),
            });
        }
    }

    items.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    let mut seen = HashSet::new();
    items.retain(|item| {
        let fresh = seen.insert(item.relative_path.clone());
        if !fresh {
            tracing::warn!(
                "{} maps to {} which is already provided; ignoring it",
                item.source.display(),
                item.relative_path
            );
        }
        fresh
    });
    Ok(items)
}

fn legacy_items(config: &SyncConfig) -> Result<Vec<SyncItem>, SyncError> {
    let mut items = Vec::new();
    for (name, path) in visible_children(&config.source_root)? {
        if !is_legacy_name(&name, &config.legacy_prefix) {
            continue;
        }
        let relative_path = to_relative_path(&name, &config.legacy_prefix);
        if relative_path.trim_matches('/').is_empty() {
            tracing::warn!("ignoring legacy entry with empty path: {}", path.display());
            continue;
        }
        items.push(SyncItem {
            is_directory: path.is_dir(),
            source: path,
            relative_path,
        });
    }
    Ok(items)
}

/// What the source currently holds for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryView {
    /// Name -> source path. Directory children, plus legacy entries that
    /// translate to a direct child of the category.
    pub entries: BTreeMap<String, PathBuf>,
    /// Names that are not entries themselves but have legacy entries nested
    /// below them (`ROOT_AGENTS_skills_a_b.md` shadows `skills/a`).
    pub shadowed: BTreeSet<String>,
}

impl CategoryView {
    pub fn names(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Current view of `<source_root>/<category>` including legacy entries.
pub fn category_view(config: &SyncConfig, category: &Category) -> Result<CategoryView, SyncError> {
    let mut view = CategoryView::default();
    for item in legacy_items(config)? {
        let Some((cat, rest)) = split_category(&item.relative_path) else {
            continue;
        };
        if cat != category.as_str() {
            continue;
        }
        let rest = rest.trim_matches('/');
        match rest.split_once('/') {
            None if !rest.is_empty() => {
                view.entries.entry(rest.to_string()).or_insert(item.source);
            }
            Some((first, _)) if !first.is_empty() => {
                view.shadowed.insert(first.to_string());
            }
            _ => {}
        }
    }
    for (name, path) in visible_children(&config.source_root.join(category.as_str()))? {
        view.entries.entry(name).or_insert(path);
    }
    view.shadowed.retain(|name| !view.entries.contains_key(name));
    Ok(view)
}

/// Names currently provided for `category`.
pub fn current_names(config: &SyncConfig, category: &Category) -> Result<BTreeSet<String>, SyncError> {
    Ok(category_view(config, category)?.names())
}
