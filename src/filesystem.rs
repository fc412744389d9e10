//! On-disk helpers for materializing working copies and writing caches

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Recursively copy `src` into `dst`, creating `dst` and any parents.
///
/// Everything under `src` is copied, `.git` included, so the copy is a
/// usable working copy in its own right.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| {
            Error::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop while copying")),
            )
        })?;
        // Entries yielded by WalkDir always live under the root we gave it
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// Replace `path` with `contents` in one step.
///
/// The data is written to a temporary file next to `path` and renamed over
/// it, so readers never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_all_nested() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("deep/nested")).unwrap();
        fs::write(src.join("index.html.md.erb"), "hello").unwrap();
        fs::write(src.join("deep/nested/page.md"), "nested").unwrap();

        let dst = temp.path().join("out/copy");
        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(
            fs::read_to_string(dst.join("index.html.md.erb")).unwrap(),
            "hello"
        );
        assert_eq!(
            fs::read_to_string(dst.join("deep/nested/page.md")).unwrap(),
            "nested"
        );
    }

    #[test]
    fn test_copy_dir_all_keeps_git_directory() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join(".git")).unwrap();
        fs::write(src.join(".git/HEAD"), "ref: refs/heads/master").unwrap();

        let dst = temp.path().join("dst");
        copy_dir_all(&src, &dst).unwrap();

        assert!(dst.join(".git/HEAD").exists());
    }

    #[test]
    fn test_copy_dir_all_empty_source() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("empty");
        fs::create_dir_all(&src).unwrap();

        let dst = temp.path().join("dst");
        copy_dir_all(&src, &dst).unwrap();

        assert!(dst.is_dir());
        assert_eq!(fs::read_dir(&dst).unwrap().count(), 0);
    }

    #[test]
    fn test_write_atomic_creates_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cache/cached_shas.yml");

        write_atomic(&path, b"old").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");

        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
