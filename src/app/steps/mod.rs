pub mod manifest;
pub mod namespace;
pub mod source_patch;

pub use manifest::{ManifestStep, MINIMAL_MANIFEST};
pub use namespace::{fallback_namespace, NamespaceStep};
pub use source_patch::SourcePatchStep;

use crate::config::toml_config::ProjectOverride;
use crate::domain::ports::ProjectStep;

/// What every step can see while a single subproject is configured.
#[derive(Debug, Clone)]
pub struct StepContext<'a> {
    pub fallback_prefix: &'a str,
    pub overrides: &'a [ProjectOverride],
    pub source_patches_enabled: bool,
}

impl<'a> StepContext<'a> {
    pub fn override_for(&self, project: &str) -> Option<&'a ProjectOverride> {
        self.overrides.iter().find(|o| o.project == project)
    }
}

/// Steps in the order they run for each library subproject.
pub fn default_steps() -> Vec<Box<dyn ProjectStep>> {
    vec![
        Box::new(NamespaceStep),
        Box::new(ManifestStep),
        Box::new(SourcePatchStep),
    ]
}
