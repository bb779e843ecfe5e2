//! Import phase: feed content created at import-source targets back into the
//! source root.
//!
//! Decision per visible child of each category directory at the target:
//!
//! | source has name | manifest has name | outcome                                   |
//! |-----------------|-------------------|-------------------------------------------|
//! | yes             | any               | `Exists` if equal, else newest mtime wins |
//! | no              | yes               | `Deleted` (removed upstream, never reimported) |
//! | no              | no                | `Import`                                  |
//!
//! A conflict keeps the source content; the target copy is overwritten by the
//! forward sync that follows.

use std::fs;
use std::path::PathBuf;

use agentmirror_core::{Category, SyncConfig, Target};

use crate::compare::{dirs_equal, files_equal};
use crate::error::{io_err, SyncError};
use crate::fsops::{newest_mtime, replace_with_copy, visible_children};
use crate::manifest::Manifest;
use crate::source::{category_view, CategoryView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// Copy into the source (new, or newer than the source copy).
    Import,
    /// Both sides differ and the source is at least as recent; source wins.
    Conflict,
    /// Identical to the source already.
    Exists,
    /// Known to the manifest but removed from the source.
    Deleted,
}

/// One import candidate found at a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAction {
    /// Entry as it appears at the target (possibly a symlink).
    pub origin: PathBuf,
    /// Where the content actually lives.
    pub resolved: PathBuf,
    pub source_dest: PathBuf,
    pub category: Category,
    pub name: String,
    pub relative_path: String,
    pub is_directory: bool,
    pub is_symlink: bool,
    /// The source already had this name when the plan was built.
    pub replaces_existing: bool,
    pub status: ImportStatus,
}

#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub target: Target,
    pub actions: Vec<ImportAction>,
}

impl ImportPlan {
    pub fn importable(&self) -> impl Iterator<Item = &ImportAction> {
        self.actions.iter().filter(|a| a.status == ImportStatus::Import)
    }

    pub fn has_imports(&self) -> bool {
        self.importable().next().is_some()
    }
}

/// Outcome of applying one `Import` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Name was new to the source.
    Imported,
    /// Replaced an older source copy.
    Updated,
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct AppliedImport {
    pub relative_path: String,
    pub is_directory: bool,
    pub is_symlink: bool,
    pub outcome: ImportOutcome,
}

/// An import plan together with what happened when it was applied.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub plan: ImportPlan,
    pub applied: Vec<AppliedImport>,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Scan `target` for import candidates against the current source and
/// `manifest`. Reads only; unreadable target entries are skipped with a warning.
pub fn build_import_plan(
    config: &SyncConfig,
    target: &Target,
    manifest: &Manifest,
) -> Result<ImportPlan, SyncError> {
    let mut actions = Vec::new();

    for category in &config.categories {
        let target_dir = target.root.join(category.as_str());
        if !target_dir.is_dir() {
            continue;
        }
        let view = category_view(config, category)?;
        let children = match visible_children(&target_dir) {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!("skipping {}: {e}", target_dir.display());
                continue;
            }
        };

        for (name, origin) in children {
            if view.shadowed.contains(&name) {
                tracing::debug!("{category}/{name} is provided by nested legacy entries; skipped");
                continue;
            }
            match classify(config, category, &name, origin, &view, manifest) {
                Ok(Some(action)) => actions.push(action),
                Ok(None) => {}
                Err(e) => tracing::warn!("skipping import candidate {category}/{name}: {e}"),
            }
        }
    }

    Ok(ImportPlan {
        target: target.clone(),
        actions,
    })
}

fn classify(
    config: &SyncConfig,
    category: &Category,
    name: &str,
    origin: PathBuf,
    view: &CategoryView,
    manifest: &Manifest,
) -> Result<Option<ImportAction>, SyncError> {
    let link = fs::symlink_metadata(&origin).map_err(|e| io_err(&origin, e))?;
    let is_symlink = link.file_type().is_symlink();
    let resolved = if is_symlink {
        match fs::canonicalize(&origin) {
            Ok(p) => p,
            Err(_) => {
                tracing::debug!("broken symlink, skipped: {}", origin.display());
                return Ok(None);
            }
        }
    } else {
        origin.clone()
    };
    let is_directory = resolved.is_dir();
    let relative_path = format!("{category}/{name}");
    let (source_dest, replaces_existing) = match view.entries.get(name) {
        Some(path) => (path.clone(), true),
        None => (config.source_root.join(category.as_str()).join(name), false),
    };

    let status = if replaces_existing {
        let equal = match (is_directory, source_dest.is_dir()) {
            (true, true) => dirs_equal(&source_dest, &resolved)?,
            (false, false) => files_equal(&source_dest, &resolved)?,
            _ => false,
        };
        if equal {
            ImportStatus::Exists
        } else if newest_mtime(&resolved)? > newest_mtime(&source_dest)? {
            ImportStatus::Import
        } else {
            ImportStatus::Conflict
        }
    } else if manifest.contains(category, name) {
        ImportStatus::Deleted
    } else {
        ImportStatus::Import
    };
    tracing::debug!("import candidate {relative_path}: {status:?}");

    Ok(Some(ImportAction {
        origin,
        resolved,
        source_dest,
        category: category.clone(),
        name: name.to_string(),
        relative_path,
        is_directory,
        is_symlink,
        replaces_existing,
        status,
    }))
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Copy every `Import` action into the source and record the name in the
/// in-memory manifest right away, so later phases of the same run see it.
///
/// A failing item is reported and does not stop the others.
pub fn apply_import(plan: &ImportPlan, manifest: &mut Manifest) -> Vec<AppliedImport> {
    plan.importable()
        .map(|action| {
            let outcome = match replace_with_copy(&action.resolved, &action.source_dest) {
                Ok(()) => {
                    manifest.insert(&action.category, action.name.clone());
                    tracing::info!(
                        "imported {} from {}",
                        action.relative_path,
                        action.resolved.display()
                    );
                    if action.replaces_existing {
                        ImportOutcome::Updated
                    } else {
                        ImportOutcome::Imported
                    }
                }
                Err(e) => {
                    tracing::warn!("import of {} failed: {e}", action.relative_path);
                    ImportOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            AppliedImport {
                relative_path: action.relative_path.clone(),
                is_directory: action.is_directory,
                is_symlink: action.is_symlink,
                outcome,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentmirror_core::config;
    use filetime::FileTime;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        config: SyncConfig,
        target: Target,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let mut config = config::default_at(tmp.path()).with_source_root(tmp.path().join("src"));
        let target = Target::new(tmp.path().join("t"), "T", "T.md", true);
        config.targets = vec![target.clone()];
        fs::create_dir_all(&config.source_root).unwrap();
        Fixture {
            _tmp: tmp,
            config,
            target,
        }
    }

    fn write(path: PathBuf, content: &str, mtime: i64) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        filetime::set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
    }

    fn status_of(plan: &ImportPlan, rel: &str) -> ImportStatus {
        plan.actions
            .iter()
            .find(|a| a.relative_path == rel)
            .map(|a| a.status)
            .unwrap_or_else(|| panic!("no action for {rel}"))
    }

    #[test]
    fn unknown_item_is_imported() {
        let f = fixture();
        write(f.target.root.join("skills/new/f.txt"), "x", 100);
        let plan = build_import_plan(&f.config, &f.target, &Manifest::default()).unwrap();
        assert_eq!(status_of(&plan, "skills/new"), ImportStatus::Import);
    }

    #[test]
    fn manifest_only_item_is_deleted() {
        let f = fixture();
        write(f.target.root.join("skills/gone/f.txt"), "x", 100);
        let mut m = Manifest::default();
        m.insert(&Category::from("skills"), "gone");
        let plan = build_import_plan(&f.config, &f.target, &m).unwrap();
        assert_eq!(status_of(&plan, "skills/gone"), ImportStatus::Deleted);
    }

    #[test]
    fn equal_content_exists_and_newer_target_imports() {
        let f = fixture();
        write(f.config.source_root.join("commands/a.md"), "same", 100);
        write(f.target.root.join("commands/a.md"), "same", 500);
        write(f.config.source_root.join("commands/b.md"), "old", 100);
        write(f.target.root.join("commands/b.md"), "new", 200);
        write(f.config.source_root.join("commands/c.md"), "src", 300);
        write(f.target.root.join("commands/c.md"), "tgt", 200);

        let plan = build_import_plan(&f.config, &f.target, &Manifest::default()).unwrap();
        assert_eq!(status_of(&plan, "commands/a.md"), ImportStatus::Exists);
        assert_eq!(status_of(&plan, "commands/b.md"), ImportStatus::Import);
        assert_eq!(status_of(&plan, "commands/c.md"), ImportStatus::Conflict);
    }

    #[test]
    fn equal_mtime_is_a_conflict() {
        let f = fixture();
        write(f.config.source_root.join("commands/a.md"), "src", 100);
        write(f.target.root.join("commands/a.md"), "tgt", 100);
        let plan = build_import_plan(&f.config, &f.target, &Manifest::default()).unwrap();
        assert_eq!(status_of(&plan, "commands/a.md"), ImportStatus::Conflict);
    }

    #[test]
    fn directory_recency_uses_newest_file_anywhere() {
        let f = fixture();
        write(f.config.source_root.join("skills/s/top.txt"), "a", 300);
        write(f.target.root.join("skills/s/top.txt"), "b", 100);
        write(f.target.root.join("skills/s/deep/inner.txt"), "c", 400);
        let plan = build_import_plan(&f.config, &f.target, &Manifest::default()).unwrap();
        assert_eq!(status_of(&plan, "skills/s"), ImportStatus::Import);
    }

    #[test]
    #[cfg(unix)]
    fn broken_symlink_is_skipped_silently() {
        let f = fixture();
        fs::create_dir_all(f.target.root.join("skills")).unwrap();
        std::os::unix::fs::symlink(
            f.target.root.join("nowhere"),
            f.target.root.join("skills").join("dangling"),
        )
        .unwrap();
        let plan = build_import_plan(&f.config, &f.target, &Manifest::default()).unwrap();
        assert!(plan.actions.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn symlinked_item_is_imported_as_real_content() {
        let f = fixture();
        let elsewhere = f.target.root.parent().unwrap().join("elsewhere").join("linked");
        write(elsewhere.join("f.txt"), "linked", 100);
        fs::create_dir_all(f.target.root.join("skills")).unwrap();
        std::os::unix::fs::symlink(&elsewhere, f.target.root.join("skills").join("linked")).unwrap();

        let mut m = Manifest::default();
        let plan = build_import_plan(&f.config, &f.target, &m).unwrap();
        let action = &plan.actions[0];
        assert!(action.is_symlink && action.is_directory);

        let applied = apply_import(&plan, &mut m);
        assert_eq!(applied[0].outcome, ImportOutcome::Imported);
        let dest = f.config.source_root.join("skills").join("linked");
        assert!(!crate::fsops::is_symlink(&dest));
        assert_eq!(fs::read_to_string(dest.join("f.txt")).unwrap(), "linked");
        assert!(m.contains(&Category::from("skills"), "linked"));
    }

    #[test]
    fn apply_updates_existing_and_reports_it() {
        let f = fixture();
        write(f.config.source_root.join("commands/b.md"), "old", 100);
        write(f.target.root.join("commands/b.md"), "new", 200);
        let mut m = Manifest::default();
        let plan = build_import_plan(&f.config, &f.target, &m).unwrap();
        let applied = apply_import(&plan, &mut m);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].outcome, ImportOutcome::Updated);
        assert_eq!(
            fs::read_to_string(f.config.source_root.join("commands/b.md")).unwrap(),
            "new"
        );
    }
}
