//! Disk helpers used while staging and publishing a site
//!
//! All copies are plain file copies; symbolic links are followed.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Copy one file, creating parent directories of `to` as needed.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Staging {
            message: format!("Failed to create directory '{}': {}", parent.display(), e),
        })?;
    }
    fs::copy(from, to).map_err(|e| Error::Staging {
        message: format!(
            "Failed to copy '{}' to '{}': {}",
            from.display(),
            to.display(),
            e
        ),
    })?;
    Ok(())
}

/// Recursively copy the contents of `from` into `to`.
///
/// `to` is created if missing; existing files are replaced. Returns the
/// number of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    fs::create_dir_all(to).map_err(|e| Error::Staging {
        message: format!("Failed to create directory '{}': {}", to.display(), e),
    })?;

    let mut copied = 0;
    for entry in WalkDir::new(from).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| Error::Staging {
            message: format!("Failed to read '{}': {}", from.display(), e),
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::Path {
                message: e.to_string(),
            })?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Remove a file or directory tree; a missing path is not an error.
pub fn remove_all(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path)?,
        Ok(_) => fs::remove_file(path)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// All files beneath `root`, relative to it, sorted
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| Error::Staging {
            message: format!("Failed to read '{}': {}", root.display(), e),
        })?;
        if entry.file_type().is_file() {
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_tree_nested() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("from");
        fs::create_dir_all(from.join("a/b")).unwrap();
        fs::write(from.join("top.md"), "top").unwrap();
        fs::write(from.join("a/b/deep.png"), [0u8, 1, 2]).unwrap();
        fs::create_dir_all(from.join("empty")).unwrap();

        let to = temp.path().join("to/nested");
        let copied = copy_tree(&from, &to).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(to.join("top.md")).unwrap(), "top");
        assert_eq!(fs::read(to.join("a/b/deep.png")).unwrap(), vec![0u8, 1, 2]);
        assert!(to.join("empty").is_dir());
    }

    #[test]
    fn test_copy_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("source.txt");
        fs::write(&from, "content").unwrap();

        let to = temp.path().join("x/y/z.txt");
        copy_file(&from, &to).unwrap();
        assert_eq!(fs::read_to_string(to).unwrap(), "content");
    }

    #[test]
    fn test_copy_file_missing_source() {
        let temp = TempDir::new().unwrap();
        let result = copy_file(&temp.path().join("missing"), &temp.path().join("out"));
        assert!(matches!(result, Err(Error::Staging { .. })));
    }

    #[test]
    fn test_remove_all() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir_all(dir.join("inner")).unwrap();
        fs::write(dir.join("inner/file"), "x").unwrap();
        let file = temp.path().join("file");
        fs::write(&file, "x").unwrap();

        remove_all(&dir).unwrap();
        remove_all(&file).unwrap();
        remove_all(&temp.path().join("never-existed")).unwrap();

        assert!(!dir.exists());
        assert!(!file.exists());
    }

    #[test]
    fn test_list_files_sorted_relative() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("b")).unwrap();
        fs::write(temp.path().join("b/two.html"), "").unwrap();
        fs::write(temp.path().join("a.html"), "").unwrap();

        let files = list_files(temp.path()).unwrap();
        assert_eq!(files, vec![PathBuf::from("a.html"), PathBuf::from("b/two.html")]);
    }
}
