//! Discovery and creation of the `.bugsage/` project directory.
//!
//! `.bugsage/` holds the config file, the SQLite database and uploaded
//! attachments. Commands locate it by walking up from the working directory.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Name of the project metadata directory.
pub const BUGSAGE_DIR_NAME: &str = ".bugsage";

/// Environment variable that pins the project directory.
pub const BUGSAGE_DIR_ENV: &str = "BUGSAGE_DIR";

/// Finds the `.bugsage/` directory for `start`.
///
/// `BUGSAGE_DIR` wins when it names an existing directory. Otherwise the
/// tree is walked upward from `start` until a `.bugsage/` child is found or
/// the filesystem root is reached.
pub fn find_bugsage_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(BUGSAGE_DIR_ENV) {
        let env_path = PathBuf::from(env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }
    walk_up(start)
}

fn walk_up(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .map(|dir| dir.join(BUGSAGE_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Like [`find_bugsage_dir`], but a miss is [`ConfigError::DirNotFound`].
pub fn find_bugsage_dir_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_bugsage_dir(start).ok_or(ConfigError::DirNotFound)
}

/// Creates `<path>/.bugsage/` (or `path` itself when it is already named
/// `.bugsage`) and returns it.
pub fn ensure_bugsage_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let dir = if path.ends_with(BUGSAGE_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(BUGSAGE_DIR_NAME)
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// The directory containing `.bugsage/`; relative config paths resolve
/// against it.
pub fn project_root(bugsage_dir: &Path) -> PathBuf {
    bugsage_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_dir_from_nested_child() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join(BUGSAGE_DIR_NAME);
        std::fs::create_dir(&marker).unwrap();
        let child = tmp.path().join("src").join("deep");
        std::fs::create_dir_all(&child).unwrap();

        let found = walk_up(&child).unwrap();
        assert_eq!(found, marker.canonicalize().unwrap());
    }

    #[test]
    fn missing_start_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(walk_up(&tmp.path().join("does-not-exist")).is_none());
    }

    #[test]
    fn ensure_creates_and_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let first = ensure_bugsage_dir(tmp.path()).unwrap();
        assert!(first.is_dir());
        assert!(first.ends_with(BUGSAGE_DIR_NAME));
        assert_eq!(ensure_bugsage_dir(&first).unwrap(), first);
    }

    #[test]
    fn root_is_parent_of_marker() {
        let root = project_root(Path::new("/work/app/.bugsage"));
        assert_eq!(root, PathBuf::from("/work/app"));
    }
}
