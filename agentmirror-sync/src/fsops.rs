//! Filesystem primitives: visible-entry listing, whole-item copy and removal.
//!
//! Entries whose name starts with `.` are invisible at every listing point,
//! including inside copied and compared subtrees.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;

use crate::error::{io_err, SyncError};

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Non-hidden children of `dir`, sorted by name.
///
/// A path that is missing or not a directory yields no children.
pub fn visible_children(dir: &Path) -> Result<Vec<(String, PathBuf)>, SyncError> {
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&name) {
            continue;
        }
        children.push((name, entry.path()));
    }
    children.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(children)
}

/// True for any entry at `path`, including a dangling symlink.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

/// Replace whatever occupies `dst` with a real copy of `src`.
///
/// Symlinks in `src` are followed. Files keep their permissions and
/// timestamps. The copy is staged at `<dst>.agentmirror.tmp` and renamed into
/// place, so a failed copy leaves `dst` as it was.
pub fn replace_with_copy(src: &Path, dst: &Path) -> Result<(), SyncError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let meta = fs::metadata(src).map_err(|e| io_err(src, e))?;
    let tmp = staging_path(dst);
    remove_entry(&tmp)?;
    let staged = if meta.is_dir() {
        copy_dir_recursive(src, &tmp)
    } else {
        copy_file_with_times(src, &tmp)
    };
    if let Err(e) = staged {
        let _ = remove_entry(&tmp);
        return Err(e);
    }

    // rename only replaces a file or symlink; anything else has to go first.
    let occupied_by_dir = fs::symlink_metadata(dst)
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if meta.is_dir() || occupied_by_dir {
        if let Err(e) = remove_entry(dst) {
            let _ = remove_entry(&tmp);
            return Err(e);
        }
    }
    if let Err(e) = fs::rename(&tmp, dst) {
        let _ = remove_entry(&tmp);
        return Err(io_err(dst, e));
    }
    Ok(())
}

fn staging_path(dst: &Path) -> PathBuf {
    PathBuf::from(format!("{}.agentmirror.tmp", dst.display()))
}

fn copy_file_with_times(src: &Path, dst: &Path) -> Result<(), SyncError> {
    fs::copy(src, dst).map_err(|e| io_err(dst, e))?;
    let meta = fs::metadata(src).map_err(|e| io_err(src, e))?;
    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(dst, atime, mtime).map_err(|e| io_err(dst, e))
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), SyncError> {
    fs::create_dir_all(dst).map_err(|e| io_err(dst, e))?;
    for (name, child) in visible_children(src)? {
        let to = dst.join(&name);
        let meta = fs::metadata(&child).map_err(|e| io_err(&child, e))?;
        if meta.is_dir() {
            copy_dir_recursive(&child, &to)?;
        } else {
            copy_file_with_times(&child, &to)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Remove
// ---------------------------------------------------------------------------

/// Remove the entry at `path`: unlink a symlink, remove a directory tree, or
/// delete a file. Missing entries are not an error.
pub fn remove_entry(path: &Path) -> Result<(), SyncError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(io_err(path, e)),
    };
    let result = if meta.file_type().is_symlink() {
        remove_symlink(path)
    } else if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| io_err(path, e))
}

#[cfg(not(windows))]
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path)
}

#[cfg(windows)]
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

// ---------------------------------------------------------------------------
// Recency
// ---------------------------------------------------------------------------

/// Most recent modification time of any file at or below `path`.
///
/// Directories themselves do not count; an empty tree reports the epoch.
/// Symlinked directories inside the tree are not descended into.
pub fn newest_mtime(path: &Path) -> Result<SystemTime, SyncError> {
    let meta = fs::metadata(path).map_err(|e| io_err(path, e))?;
    if !meta.is_dir() {
        return meta.modified().map_err(|e| io_err(path, e));
    }
    let mut newest = SystemTime::UNIX_EPOCH;
    for (_, child) in visible_children(path)? {
        let link = fs::symlink_metadata(&child).map_err(|e| io_err(&child, e))?;
        let candidate = if link.file_type().is_symlink() {
            match fs::metadata(&child) {
                Ok(m) if m.is_file() => m.modified().map_err(|e| io_err(&child, e))?,
                _ => continue,
            }
        } else if link.is_dir() {
            newest_mtime(&child)?
        } else {
            link.modified().map_err(|e| io_err(&child, e))?
        };
        newest = newest.max(candidate);
    }
    Ok(newest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
