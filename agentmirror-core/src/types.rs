//! Domain types shared by the sync engine and the CLI.
//!
//! All path fields use `PathBuf`; relative item paths inside a tree are plain
//! `/`-separated strings so that they are identical for every target.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A top-level grouping directory (e.g. `commands`, `skills`, `agents`) whose
/// children are synced one by one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Category(pub String);

impl Category {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Human-readable label of a target, used only for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetName(pub String);

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TargetName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TargetName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// One directory tree kept in merge-sync with the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Absolute root of the tree; created on demand.
    pub root: PathBuf,
    pub name: TargetName,
    /// File name the source base file is written to, e.g. `CLAUDE.md`.
    pub base_file: String,
    /// When set, new content found here is imported into the source.
    pub import_source: bool,
}

impl Target {
    pub fn new(
        root: impl Into<PathBuf>,
        name: impl Into<TargetName>,
        base_file: impl Into<String>,
        import_source: bool,
    ) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            base_file: base_file.into(),
            import_source,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(Category::from("skills").to_string(), "skills");
        assert_eq!(TargetName::from("Claude").to_string(), "Claude");
    }

    #[test]
    fn categories_order_by_name() {
        let mut cats = vec![Category::from("skills"), Category::from("agents")];
        cats.sort();
        assert_eq!(cats[0].as_str(), "agents");
    }

    #[test]
    fn target_new_converts_arguments() {
        let t = Target::new("/tmp/.claude", "Claude", "CLAUDE.md", true);
        assert_eq!(t.root, PathBuf::from("/tmp/.claude"));
        assert_eq!(t.name, TargetName::from("Claude"));
        assert!(t.import_source);
    }
}
