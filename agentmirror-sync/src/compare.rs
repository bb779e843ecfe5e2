//! Byte-exact file comparison and recursive structural directory comparison.

use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{io_err, SyncError};
use crate::fsops::visible_children;

const CHUNK: usize = 8 * 1024;

/// True iff `b` exists and holds exactly the bytes of `a`.
///
/// Differing lengths answer `false` early; equal lengths are always confirmed
/// by reading both files.
pub fn files_equal(a: &Path, b: &Path) -> Result<bool, SyncError> {
    let Ok(meta_b) = fs::metadata(b) else {
        return Ok(false);
    };
    if !meta_b.is_file() {
        return Ok(false);
    }
    let meta_a = fs::metadata(a).map_err(|e| io_err(a, e))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut ra = BufReader::new(File::open(a).map_err(|e| io_err(a, e))?);
    let mut rb = BufReader::new(File::open(b).map_err(|e| io_err(b, e))?);
    let mut buf_a = [0u8; CHUNK];
    let mut buf_b = [0u8; CHUNK];
    loop {
        let n = ra.read(&mut buf_a).map_err(|e| io_err(a, e))?;
        if n == 0 {
            let rest = rb.read(&mut buf_b[..1]).map_err(|e| io_err(b, e))?;
            return Ok(rest == 0);
        }
        match rb.read_exact(&mut buf_b[..n]) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(false),
            Err(e) => return Err(io_err(b, e)),
        }
        if buf_a[..n] != buf_b[..n] {
            return Ok(false);
        }
    }
}

/// True iff `b` is a directory with the same visible children as `a`, of the
/// same kind, with every file byte-identical, at every depth.
pub fn dirs_equal(a: &Path, b: &Path) -> Result<bool, SyncError> {
    if !b.is_dir() {
        return Ok(false);
    }
    let left = visible_children(a)?;
    let right = visible_children(b)?;
    if left.len() != right.len() || left.iter().zip(&right).any(|(l, r)| l.0 != r.0) {
        return Ok(false);
    }

    for ((_, la), (_, rb)) in left.iter().zip(&right) {
        let ma = fs::metadata(la).map_err(|e| io_err(la, e))?;
        let mb = fs::metadata(rb).map_err(|e| io_err(rb, e))?;
        let same = match (ma.is_dir(), mb.is_dir()) {
            (true, true) => dirs_equal(la, rb)?,
            (false, false) => files_equal(la, rb)?,
            _ => false,
        };
        if !same {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Dispatch on `is_directory`.
pub fn items_equal(a: &Path, b: &Path, is_directory: bool) -> Result<bool, SyncError> {
    if is_directory {
        dirs_equal(a, b)
    } else {
        files_equal(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree(root: &Path, files: &[(&str, &str)]) {
        for (rel, content) in files {
            let p = root.join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, content).unwrap();
        }
    }

    #[test]
    fn files_equal_missing_target_is_false() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        fs::write(&a, "x").unwrap();
        assert!(!files_equal(&a, &tmp.path().join("b")).unwrap());
    }

    #[test]
    fn files_equal_same_size_different_bytes() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::write(&a, "abcd").unwrap();
        fs::write(&b, "abce").unwrap();
        assert!(!files_equal(&a, &b).unwrap());
        fs::write(&b, "abcd").unwrap();
        assert!(files_equal(&a, &b).unwrap());
    }

    #[test]
    fn files_equal_across_chunk_boundary() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        let mut big = vec![7u8; CHUNK * 3 + 17];
        fs::write(&a, &big).unwrap();
        fs::write(&b, &big).unwrap();
        assert!(files_equal(&a, &b).unwrap());
        *big.last_mut().unwrap() = 8;
        fs::write(&b, &big).unwrap();
        assert!(!files_equal(&a, &b).unwrap());
    }

    #[test]
    fn dirs_equal_detects_extra_child_on_either_side() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        tree(&a, &[("f.txt", "1")]);
        tree(&b, &[("f.txt", "1")]);
        assert!(dirs_equal(&a, &b).unwrap());

        tree(&b, &[("extra.txt", "")]);
        assert!(!dirs_equal(&a, &b).unwrap());
        assert!(!dirs_equal(&b, &a).unwrap());
    }

    #[test]
    fn dirs_equal_detects_deep_content_change() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        tree(&a, &[("x/y/z.txt", "v1")]);
        tree(&b, &[("x/y/z.txt", "v2")]);
        assert!(!dirs_equal(&a, &b).unwrap());
    }

    #[test]
    fn dirs_equal_kind_mismatch_is_false() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        tree(&a, &[("same/inner.txt", "")]);
        tree(&b, &[("same", "")]);
        assert!(!dirs_equal(&a, &b).unwrap());
    }

    #[test]
    fn dirs_equal_ignores_hidden_entries() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        tree(&a, &[("f.txt", "1")]);
        tree(&b, &[("f.txt", "1"), (".DS_Store", "x")]);
        assert!(dirs_equal(&a, &b).unwrap());
    }

    #[test]
    fn dirs_equal_against_file_is_false() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        tree(&a, &[("f.txt", "1")]);
        let b = tmp.path().join("b");
        fs::write(&b, "").unwrap();
        assert!(!dirs_equal(&a, &b).unwrap());
        assert!(!dirs_equal(&a, &tmp.path().join("missing")).unwrap());
    }
}
