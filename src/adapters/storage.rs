use crate::domain::ports::Storage;
use crate::utils::error::{PatchError, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| PatchError::io(path, e))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PatchError::io(parent, e))?;
        }
        fs::write(path, contents).map_err(|e| PatchError::io(path, e))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<bool> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(PatchError::CleanFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Reads from disk but keeps every write and removal in memory.
#[derive(Debug, Default)]
pub struct DryRunStorage {
    writes: RefCell<BTreeMap<PathBuf, String>>,
    removed: RefCell<BTreeSet<PathBuf>>,
}

impl DryRunStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_writes(&self) -> Vec<PathBuf> {
        self.writes.borrow().keys().cloned().collect()
    }

    pub fn pending_removals(&self) -> Vec<PathBuf> {
        self.removed.borrow().iter().cloned().collect()
    }

    fn is_removed(&self, path: &Path) -> bool {
        self.removed.borrow().iter().any(|r| path.starts_with(r))
    }
}

impl Storage for DryRunStorage {
    fn exists(&self, path: &Path) -> bool {
        if self.writes.borrow().contains_key(path) {
            return true;
        }
        !self.is_removed(path) && path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        if let Some(content) = self.writes.borrow().get(path) {
            return Ok(content.clone());
        }
        if self.is_removed(path) {
            return Err(PatchError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "removed during dry run"),
            ));
        }
        fs::read_to_string(path).map_err(|e| PatchError::io(path, e))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        tracing::debug!("dry run: would write {}", path.display());
        self.writes
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<bool> {
        if !self.exists(path) {
            return Ok(false);
        }
        tracing::debug!("dry run: would remove {}", path.display());
        self.writes.borrow_mut().retain(|p, _| !p.starts_with(path));
        self.removed.borrow_mut().insert(path.to_path_buf());
        Ok(true)
    }
}
