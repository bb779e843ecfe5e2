//! Apply engine: executes a [`TargetPlan`].
//!
//! `New` items are copied unconditionally. `Changed` items and deletions go
//! through a [`Confirm`] provider; a "no" leaves the target untouched and is
//! reported as skipped. A failing item is reported and the rest continue.

use std::fs;

use agentmirror_core::TargetName;

use crate::fsops::{remove_entry, replace_with_copy};
use crate::plan::{DeleteAction, SyncAction, SyncStatus, TargetPlan};

/// Yes/no decision provider for overwrites and deletions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Answers yes to everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Created,
    Updated,
    Unchanged,
    Deleted,
    /// Operator declined.
    Skipped,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub relative_path: String,
    pub is_directory: bool,
    pub outcome: ItemOutcome,
}

/// What happened at one target.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: TargetName,
    pub items: Vec<ItemReport>,
    pub deletions: Vec<ItemReport>,
}

impl TargetReport {
    pub fn all(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().chain(&self.deletions)
    }

    pub fn failures(&self) -> usize {
        self.all()
            .filter(|r| matches!(r.outcome, ItemOutcome::Failed { .. }))
            .count()
    }
}

/// Apply `plan` to its target, base file first, then items, then deletions.
pub fn apply_target(plan: &TargetPlan, confirm: &mut dyn Confirm) -> TargetReport {
    let root = &plan.target.root;
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("cannot create target root {}: {e}", root.display());
    }

    let items = plan
        .items
        .iter()
        .map(|action| ItemReport {
            relative_path: action.relative_path.clone(),
            is_directory: action.is_directory,
            outcome: apply_sync_action(&plan.target.name, action, confirm),
        })
        .collect();

    let deletions = plan
        .deletions
        .iter()
        .map(|deletion| ItemReport {
            relative_path: deletion.relative_path.clone(),
            is_directory: deletion.is_directory,
            outcome: apply_deletion(&plan.target.name, deletion, confirm),
        })
        .collect();

    TargetReport {
        target: plan.target.name.clone(),
        items,
        deletions,
    }
}

fn apply_sync_action(
    target: &TargetName,
    action: &SyncAction,
    confirm: &mut dyn Confirm,
) -> ItemOutcome {
    let done = match action.status {
        SyncStatus::Synced => return ItemOutcome::Unchanged,
        SyncStatus::New => ItemOutcome::Created,
        SyncStatus::Changed => {
            let prompt = format!("Overwrite {} in {target}?", action.relative_path);
            if !confirm.confirm(&prompt) {
                tracing::info!("{target}: skipped {}", action.relative_path);
                return ItemOutcome::Skipped;
            }
            ItemOutcome::Updated
        }
    };
    match replace_with_copy(&action.source, &action.target) {
        Ok(()) => {
            tracing::info!("{target}: {:?} {}", done, action.relative_path);
            done
        }
        Err(e) => {
            tracing::warn!("{target}: copy of {} failed: {e}", action.relative_path);
            ItemOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

fn apply_deletion(
    target: &TargetName,
    deletion: &DeleteAction,
    confirm: &mut dyn Confirm,
) -> ItemOutcome {
    let prompt = format!("Delete {} from {target}?", deletion.relative_path);
    if !confirm.confirm(&prompt) {
        tracing::info!("{target}: kept {}", deletion.relative_path);
        return ItemOutcome::Skipped;
    }
    match remove_entry(&deletion.target) {
        Ok(()) => {
            tracing::info!("{target}: deleted {}", deletion.relative_path);
            ItemOutcome::Deleted
        }
        Err(e) => {
            tracing::warn!("{target}: delete of {} failed: {e}", deletion.relative_path);
            ItemOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentmirror_core::Target;
    use std::path::Path;
    use tempfile::TempDir;

    fn action(src: &Path, dst: &Path, rel: &str, status: SyncStatus) -> SyncAction {
        SyncAction {
            source: src.to_path_buf(),
            target: dst.to_path_buf(),
            relative_path: rel.to_string(),
            is_directory: src.is_dir(),
            status,
        }
    }

    #[test]
    fn declined_change_is_skipped_and_untouched() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.md");
        let dst = tmp.path().join("t").join("dst.md");
        fs::write(&src, "new").unwrap();
        fs::create_dir_all(dst.parent().unwrap()).unwrap();
        fs::write(&dst, "old").unwrap();

        let plan = TargetPlan {
            target: Target::new(tmp.path().join("t"), "T", "dst.md", false),
            items: vec![action(&src, &dst, "dst.md", SyncStatus::Changed)],
            deletions: vec![],
        };
        let mut prompts = Vec::new();
        let mut deny = |p: &str| {
            prompts.push(p.to_string());
            false
        };
        let report = apply_target(&plan, &mut deny);
        assert_eq!(report.items[0].outcome, ItemOutcome::Skipped);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");
        assert_eq!(prompts, vec!["Overwrite dst.md in T?"]);
    }

    #[test]
    fn new_items_never_prompt() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.md");
        fs::write(&src, "new").unwrap();
        let dst = tmp.path().join("t").join("commands").join("x.md");
        let plan = TargetPlan {
            target: Target::new(tmp.path().join("t"), "T", "T.md", false),
            items: vec![action(&src, &dst, "commands/x.md", SyncStatus::New)],
            deletions: vec![],
        };
        let mut never = |_: &str| -> bool { panic!("new items must not prompt") };
        let report = apply_target(&plan, &mut never);
        assert_eq!(report.items[0].outcome, ItemOutcome::Created);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[test]
    fn failure_does_not_stop_later_items() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.md");
        fs::write(&good, "ok").unwrap();
        let missing = tmp.path().join("missing.md");
        let root = tmp.path().join("t");
        let plan = TargetPlan {
            target: Target::new(&root, "T", "T.md", false),
            items: vec![
                action(&missing, &root.join("a.md"), "a.md", SyncStatus::New),
                action(&good, &root.join("b.md"), "b.md", SyncStatus::New),
            ],
            deletions: vec![],
        };
        let report = apply_target(&plan, &mut AutoConfirm);
        assert!(matches!(report.items[0].outcome, ItemOutcome::Failed { .. }));
        assert_eq!(report.items[1].outcome, ItemOutcome::Created);
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn deletion_removes_directory_when_confirmed() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("t");
        let gone = root.join("skills").join("gone");
        fs::create_dir_all(gone.join("deep")).unwrap();
        let plan = TargetPlan {
            target: Target::new(&root, "T", "T.md", false),
            items: vec![],
            deletions: vec![DeleteAction {
                target: gone.clone(),
                relative_path: "skills/gone".into(),
                is_directory: true,
            }],
        };
        let report = apply_target(&plan, &mut AutoConfirm);
        assert_eq!(report.deletions[0].outcome, ItemOutcome::Deleted);
        assert!(!gone.exists());
    }
}
