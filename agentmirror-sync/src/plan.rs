//! Forward planning: what each target needs, computed without touching it.

use std::fs;
use std::path::{Path, PathBuf};

use agentmirror_core::{SyncConfig, Target};

use crate::compare::items_equal;
use crate::fsops::entry_exists;
use crate::manifest::Manifest;
use crate::naming::{is_plain_name, join_relative};
use crate::source::{current_names, SyncItem};
use crate::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Nothing at the target path.
    New,
    /// Differs from the source, or a symlink occupies the path.
    Changed,
    Synced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncAction {
    pub source: PathBuf,
    pub target: PathBuf,
    pub relative_path: String,
    pub is_directory: bool,
    pub status: SyncStatus,
}

/// A managed item removed from the source that still exists at a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAction {
    pub target: PathBuf,
    pub relative_path: String,
    pub is_directory: bool,
}

/// Everything one target needs, in apply order: base file first, then items,
/// then deletions.
#[derive(Debug, Clone)]
pub struct TargetPlan {
    pub target: Target,
    pub items: Vec<SyncAction>,
    pub deletions: Vec<DeleteAction>,
}

/// Per-status tallies of a [`TargetPlan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanCounts {
    pub new: usize,
    pub changed: usize,
    pub synced: usize,
    pub delete: usize,
}

impl TargetPlan {
    pub fn has_changes(&self) -> bool {
        !self.deletions.is_empty()
            || self.items.iter().any(|a| a.status != SyncStatus::Synced)
    }

    pub fn counts(&self) -> PlanCounts {
        let mut counts = PlanCounts {
            delete: self.deletions.len(),
            ..PlanCounts::default()
        };
        for action in &self.items {
            match action.status {
                SyncStatus::New => counts.new += 1,
                SyncStatus::Changed => counts.changed += 1,
                SyncStatus::Synced => counts.synced += 1,
            }
        }
        counts
    }
}

/// Status of `target` relative to `source`.
///
/// A symlink at the target is always `Changed`: it must become real content.
/// A comparison that fails is reported as `Changed` so the item is offered for
/// overwrite instead of silently counted as synced.
pub fn classify(source: &Path, target: &Path, is_directory: bool) -> SyncStatus {
    let meta = match fs::symlink_metadata(target) {
        Ok(m) => m,
        Err(_) => return SyncStatus::New,
    };
    if meta.file_type().is_symlink() {
        return SyncStatus::Changed;
    }
    match items_equal(source, target, is_directory) {
        Ok(true) => SyncStatus::Synced,
        Ok(false) => SyncStatus::Changed,
        Err(e) => {
            tracing::warn!("cannot compare {}: {e}", target.display());
            SyncStatus::Changed
        }
    }
}

/// Forward plan for one target: the base file plus every source item.
pub fn build_sync_plan(config: &SyncConfig, target: &Target, items: &[SyncItem]) -> TargetPlan {
    let mut actions = Vec::with_capacity(items.len() + 1);

    let source_base = config.base_file_path();
    let target_base = target.root.join(&target.base_file);
    actions.push(SyncAction {
        status: classify(&source_base, &target_base, false),
        source: source_base,
        target: target_base,
        relative_path: target.base_file.clone(),
        is_directory: false,
    });

    for item in items {
        let target_path = join_relative(&target.root, &item.relative_path);
        let status = classify(&item.source, &target_path, item.is_directory);
        tracing::debug!("{}: {} {status:?}", target.name, item.relative_path);
        actions.push(SyncAction {
            source: item.source.clone(),
            target: target_path,
            relative_path: item.relative_path.clone(),
            is_directory: item.is_directory,
            status,
        });
    }

    TargetPlan {
        target: target.clone(),
        items: actions,
        deletions: Vec::new(),
    }
}

/// Items the manifest knows but the source no longer has, that still exist
/// (as any entry, dangling symlinks included) at `target`.
pub fn build_deletion_plan(
    config: &SyncConfig,
    target: &Target,
    manifest: &Manifest,
) -> Result<Vec<DeleteAction>, SyncError> {
    let mut deletions = Vec::new();
    for category in &config.categories {
        let Some(known) = manifest.names(category) else {
            continue;
        };
        let present = current_names(config, category)?;
        for name in known.difference(&present) {
            if !is_plain_name(name) {
                tracing::warn!("ignoring manifest entry {category}/{name:?}: not a plain name");
                continue;
            }
            let target_path = target.root.join(category.as_str()).join(name);
            if entry_exists(&target_path) {
                deletions.push(DeleteAction {
                    is_directory: target_path.is_dir(),
                    target: target_path,
                    relative_path: format!("{category}/{name}"),
                });
            }
        }
    }
    Ok(deletions)
}

/// Forward plan plus deletions for one target.
pub fn plan_target(
    config: &SyncConfig,
    target: &Target,
    items: &[SyncItem],
    manifest: &Manifest,
) -> Result<TargetPlan, SyncError> {
    let mut plan = build_sync_plan(config, target, items);
    plan.deletions = build_deletion_plan(config, target, manifest)?;
    Ok(plan)
}
