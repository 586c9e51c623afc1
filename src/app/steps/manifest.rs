use super::StepContext;
use crate::domain::model::{FileAction, Subproject};
use crate::domain::ports::{ProjectStep, Storage};
use crate::utils::error::Result;

/// Valid root element with no children; the namespace comes from the build file.
pub const MINIMAL_MANIFEST: &str =
    r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" />"#;

pub struct ManifestStep;

impl ProjectStep for ManifestStep {
    fn name(&self) -> &str {
        "manifest"
    }

    fn should_apply(&self, subproject: &Subproject, context: &StepContext) -> bool {
        context
            .override_for(&subproject.name)
            .is_some_and(|o| o.manifest.is_some())
    }

    fn apply(
        &self,
        subproject: &mut Subproject,
        context: &StepContext,
        storage: &dyn Storage,
    ) -> Result<Vec<FileAction>> {
        let Some(relative) = context
            .override_for(&subproject.name)
            .and_then(|o| o.manifest.as_deref())
        else {
            return Ok(Vec::new());
        };

        let path = subproject.project_dir.join(relative);
        if storage.exists(&path) {
            return Ok(vec![FileAction::Unchanged { path }]);
        }

        storage.write(&path, MINIMAL_MANIFEST)?;
        tracing::info!("{}: created {}", subproject.name, path.display());
        Ok(vec![FileAction::Created { path }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use crate::config::toml_config::ProjectOverride;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_created_once() {
        let temp_dir = TempDir::new().unwrap();
        let overrides = vec![ProjectOverride {
            project: "fmm".to_string(),
            namespace: None,
            compile_sdk: None,
            manifest: Some("src/main/AndroidManifest.xml".to_string()),
            source_patches: Vec::new(),
        }];
        let context = StepContext {
            fallback_prefix: "fix.namespace",
            overrides: &overrides,
            source_patches_enabled: false,
        };
        let mut sub = Subproject::new("fmm", temp_dir.path());
        let storage = LocalStorage::new();
        let path = temp_dir.path().join("src/main/AndroidManifest.xml");

        assert!(ManifestStep.should_apply(&sub, &context));
        let first = ManifestStep.apply(&mut sub, &context, &storage).unwrap();
        assert_eq!(first, vec![FileAction::Created { path: path.clone() }]);
        let written = std::fs::read_to_string(&path).unwrap();

        let second = ManifestStep.apply(&mut sub, &context, &storage).unwrap();
        assert_eq!(second, vec![FileAction::Unchanged { path: path.clone() }]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
        assert_eq!(written, MINIMAL_MANIFEST);
    }

    #[test]
    fn test_projects_without_manifest_override_are_skipped() {
        let context = StepContext {
            fallback_prefix: "fix.namespace",
            overrides: &[],
            source_patches_enabled: true,
        };
        assert!(!ManifestStep.should_apply(&Subproject::new("other", "/tmp/other"), &context));
    }
}
