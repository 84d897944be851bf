//! Pre-build removal of stale browser bundle output.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Delete every entry of `dir` except the one named `preserve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupAction {
    pub dir: PathBuf,
    pub preserve: String,
}

/// What a cleanup run touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub preserved: Vec<PathBuf>,
}

impl CleanupAction {
    pub fn new(dir: impl Into<PathBuf>, preserve: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            preserve: preserve.into(),
        }
    }

    /// Run the cleanup synchronously.
    ///
    /// A missing directory has nothing to clean. Any other failure is
    /// returned as-is and leaves already-deleted entries deleted.
    pub fn execute(&self) -> io::Result<CleanupReport> {
        let mut report = CleanupReport::default();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(dir = %self.dir.display(), "output directory absent, nothing to clean");
                return Ok(report);
            }
            Err(e) => return Err(e),
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            if entry.file_name() == self.preserve.as_str() {
                report.preserved.push(path);
                continue;
            }

            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
            tracing::trace!(path = %path.display(), "removed");
            report.removed.push(path);
        }

        tracing::info!(
            dir = %self.dir.display(),
            removed = report.removed.len(),
            "cleaned output directory"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let action = CleanupAction::new(temp.path().join("dist"), "manifest.json");
        let report = action.execute().unwrap();
        assert!(report.removed.is_empty());
        assert!(report.preserved.is_empty());
    }

    #[test]
    fn removes_nested_directories() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("chunks/deep");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("a.js"), "a").unwrap();

        let report = CleanupAction::new(temp.path(), "manifest.json")
            .execute()
            .unwrap();

        assert_eq!(report.removed, vec![temp.path().join("chunks")]);
        assert!(!temp.path().join("chunks").exists());
    }

    #[test]
    fn directory_named_like_preserved_file_is_kept() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("manifest.json")).unwrap();

        let report = CleanupAction::new(temp.path(), "manifest.json")
            .execute()
            .unwrap();
        assert_eq!(report.preserved.len(), 1);
        assert!(temp.path().join("manifest.json").is_dir());
    }

    #[test]
    fn pointing_at_a_file_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();

        let err = CleanupAction::new(&file, "manifest.json")
            .execute()
            .unwrap_err();
        assert_ne!(err.kind(), io::ErrorKind::NotFound);
    }

    /// Make `dir` read-only. Returns false when the current user can write
    /// to it anyway (root), leaving it writable again.
    #[cfg(unix)]
    fn lock(dir: &std::path::Path) -> bool {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(dir, fs::Permissions::from_mode(0o500)).unwrap();
        let check = dir.join(".write-check");
        if fs::write(&check, "").is_ok() {
            fs::remove_file(&check).unwrap();
            unlock(dir);
            return false;
        }
        true
    }

    #[cfg(unix)]
    fn unlock(dir: &std::path::Path) {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn failed_deletion_is_returned_unchanged() {
        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a.js"), "a").unwrap();
        fs::write(temp.path().join("manifest.json"), "{}").unwrap();
        if !lock(&locked) {
            return;
        }

        let result = CleanupAction::new(temp.path(), "manifest.json").execute();
        unlock(&locked);

        let err = result.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(err.raw_os_error().is_some(), "{err:?}");
        assert!(err.get_ref().is_none(), "{err:?}");
        assert!(locked.join("a.js").exists());
        assert!(temp.path().join("manifest.json").exists());
    }
}
