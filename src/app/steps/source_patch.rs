use super::StepContext;
use crate::domain::model::{FileAction, Subproject};
use crate::domain::ports::{ProjectStep, Storage};
use crate::utils::error::Result;

pub struct SourcePatchStep;

impl ProjectStep for SourcePatchStep {
    fn name(&self) -> &str {
        "source-patch"
    }

    fn should_apply(&self, subproject: &Subproject, context: &StepContext) -> bool {
        context.source_patches_enabled
            && context
                .override_for(&subproject.name)
                .is_some_and(|o| !o.source_patches.is_empty())
    }

    fn apply(
        &self,
        subproject: &mut Subproject,
        context: &StepContext,
        storage: &dyn Storage,
    ) -> Result<Vec<FileAction>> {
        let Some(forced) = context.override_for(&subproject.name) else {
            return Ok(Vec::new());
        };

        forced
            .source_patches
            .iter()
            .map(|patch| patch.apply_to_file(storage, &subproject.project_dir))
            .collect()
    }
}
