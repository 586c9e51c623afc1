use crate::domain::model::{FileAction, Subproject};
use crate::utils::error::Result;
use std::path::Path;

use crate::app::steps::StepContext;

pub trait Storage {
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &str) -> Result<()>;
    /// Returns `false` when there was nothing to remove.
    fn remove_dir_all(&self, path: &Path) -> Result<bool>;
}

/// One configuration action applied to a library subproject.
pub trait ProjectStep {
    fn name(&self) -> &str;

    fn should_apply(&self, _subproject: &Subproject, _context: &StepContext) -> bool {
        true
    }

    fn apply(
        &self,
        subproject: &mut Subproject,
        context: &StepContext,
        storage: &dyn Storage,
    ) -> Result<Vec<FileAction>>;
}
