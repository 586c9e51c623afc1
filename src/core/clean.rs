use crate::domain::model::FileAction;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::Path;

/// Deletes the relocated build tree. An absent tree is not an error; a failed delete is.
pub fn clean(storage: &dyn Storage, build_dir: &Path) -> Result<FileAction> {
    if storage.remove_dir_all(build_dir)? {
        tracing::info!("removed {}", build_dir.display());
        Ok(FileAction::Removed {
            path: build_dir.to_path_buf(),
        })
    } else {
        tracing::info!("nothing to clean at {}", build_dir.display());
        Ok(FileAction::Skipped {
            path: build_dir.to_path_buf(),
            reason: "directory not found".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use tempfile::TempDir;

    #[test]
    fn test_clean_twice() {
        let temp_dir = TempDir::new().unwrap();
        let build = temp_dir.path().join("build");
        std::fs::create_dir_all(build.join("foo_bar/intermediates")).unwrap();
        std::fs::write(build.join("foo_bar/intermediates/out.bin"), b"x").unwrap();
        let storage = LocalStorage::new();

        assert!(matches!(clean(&storage, &build).unwrap(), FileAction::Removed { .. }));
        assert!(!build.exists());
        assert!(matches!(clean(&storage, &build).unwrap(), FileAction::Skipped { .. }));
    }
}
