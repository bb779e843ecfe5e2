//! Unified diff support for `agentmirror diff`.
//!
//! Shows, per target, how each `New` or `Changed` item would change the
//! target: `a/` is what the target holds now, `b/` is what sync would write.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use agentmirror_core::{SyncConfig, TargetName};

use crate::error::{io_err, SyncError};
use crate::fsops::visible_children;
use crate::pipeline::Session;
use crate::plan::{SyncAction, SyncStatus};

/// A single file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path at the target.
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diff result for a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDiff {
    pub target: TargetName,
    pub diffs: Vec<FileDiff>,
}

/// Compare the source against targets without writing anything.
///
/// `only` restricts the output to targets with that display name.
pub fn diff_targets(config: &SyncConfig, only: Option<&str>) -> Result<Vec<TargetDiff>, SyncError> {
    let session = Session::open(config)?;
    let mut results = Vec::new();
    for plan in session.plan()? {
        if only.is_some_and(|name| plan.target.name.0 != name) {
            continue;
        }
        let mut diffs = Vec::new();
        for action in &plan.items {
            if action.status == SyncStatus::Synced {
                continue;
            }
            diff_action(action, &mut diffs)?;
        }
        results.push(TargetDiff {
            target: plan.target.name.clone(),
            diffs,
        });
    }
    Ok(results)
}

fn diff_action(action: &SyncAction, out: &mut Vec<FileDiff>) -> Result<(), SyncError> {
    if !action.is_directory {
        return push_file_diff(&action.source, &action.target, &action.relative_path, out);
    }
    let mut files = BTreeSet::new();
    collect_files(&action.source, "", &mut files)?;
    collect_files(&action.target, "", &mut files)?;
    for rel in files {
        let src = action.source.join(&rel);
        let dst = action.target.join(&rel);
        push_file_diff(&src, &dst, &format!("{}/{rel}", action.relative_path), out)?;
    }
    Ok(())
}

/// Relative paths of every visible file below `root`.
fn collect_files(root: &Path, prefix: &str, out: &mut BTreeSet<String>) -> Result<(), SyncError> {
    for (name, path) in visible_children(root)? {
        let rel = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        if path.is_dir() {
            collect_files(&path, &rel, out)?;
        } else {
            out.insert(rel);
        }
    }
    Ok(())
}

fn push_file_diff(
    source: &Path,
    target: &Path,
    relative: &str,
    out: &mut Vec<FileDiff>,
) -> Result<(), SyncError> {
    let old = read_existing_or_empty(target)?;
    let new = read_existing_or_empty(source)?;
    if old == new {
        return Ok(());
    }
    let old_header = format!("a/{relative}");
    let new_header = format!("b/{relative}");
    let unified_diff = match (std::str::from_utf8(&old), std::str::from_utf8(&new)) {
        (Ok(old), Ok(new)) => TextDiff::from_lines(old, new)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string(),
        _ => format!("Binary files {old_header} and {new_header} differ\n"),
    };
    out.push(FileDiff {
        path: target.to_path_buf(),
        unified_diff,
    });
    Ok(())
}

fn read_existing_or_empty(path: &Path) -> Result<Vec<u8>, SyncError> {
    if path.is_dir() {
        return Ok(Vec::new());
    }
    match std::fs::read(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(io_err(path, err)),
    }
}
