//! Legacy flat-name translation.
//!
//! ```text
//! ROOT_AGENTS_commands_strict.md   -> commands/strict.md
//! ROOT_AGENTS_skills_my-skill/     -> skills/my-skill/
//! ROOT_AGENTS_hooks_formatter.py   -> hooks/formatter.py
//! ```
//!
//! Every `_` after the prefix becomes a `/`. There is no escape, so a legacy
//! name cannot carry a literal underscore into the target path; such items
//! must live under a category directory instead.

use std::path::{Path, PathBuf};

/// `<prefix>_`: the marker every legacy entry starts with.
pub fn legacy_marker(prefix: &str) -> String {
    format!("{prefix}_")
}

pub fn is_legacy_name(name: &str, prefix: &str) -> bool {
    name.starts_with(&legacy_marker(prefix))
}

/// Translate a legacy flat name into a `/`-separated relative path.
///
/// Names without the legacy marker are already hierarchical and come back
/// unchanged.
pub fn to_relative_path(name: &str, prefix: &str) -> String {
    match name.strip_prefix(&legacy_marker(prefix)) {
        Some(rest) => rest.replace('_', "/"),
        None => name.to_string(),
    }
}

/// Join a `/`-separated relative path onto `root` segment by segment.
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |p, s| p.join(s))
}

/// True for a single path segment: non-empty, not `.` or `..`, and free of
/// separators. Manifest names are only trusted as target paths when plain.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// `skills/my-skill` -> `("skills", "my-skill")`.
pub fn split_category(relative: &str) -> Option<(&str, &str)> {
    relative.split_once('/')
}
