use super::StepContext;
use crate::domain::model::{FileAction, Subproject};
use crate::domain::ports::{ProjectStep, Storage};
use crate::utils::error::Result;

pub const DEFAULT_FALLBACK_PREFIX: &str = "fix.namespace";

/// `<prefix>.<name>` with every `-` turned into `_`.
pub fn fallback_namespace(prefix: &str, project_name: &str) -> String {
    format!("{}.{}", prefix, project_name.replace('-', "_"))
}

/// Forces the override namespace/SDK, or fills in a fallback namespace when none is set.
pub struct NamespaceStep;

impl ProjectStep for NamespaceStep {
    fn name(&self) -> &str {
        "namespace"
    }

    fn apply(
        &self,
        subproject: &mut Subproject,
        context: &StepContext,
        _storage: &dyn Storage,
    ) -> Result<Vec<FileAction>> {
        if let Some(forced) = context.override_for(&subproject.name) {
            if let Some(namespace) = &forced.namespace {
                tracing::info!("{}: forcing namespace {}", subproject.name, namespace);
                subproject.extension.namespace = Some(namespace.clone());
            }
            if let Some(sdk) = forced.compile_sdk {
                tracing::info!("{}: forcing compileSdk {}", subproject.name, sdk);
                subproject.extension.compile_sdk = Some(sdk);
            }
            return Ok(Vec::new());
        }

        if subproject.extension.namespace.is_none() {
            let namespace = fallback_namespace(context.fallback_prefix, &subproject.name);
            tracing::info!("{}: no namespace set, using {}", subproject.name, namespace);
            subproject.extension.namespace = Some(namespace);
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DryRunStorage;
    use crate::config::toml_config::ProjectOverride;

    fn context(overrides: &[ProjectOverride]) -> StepContext<'_> {
        StepContext {
            fallback_prefix: DEFAULT_FALLBACK_PREFIX,
            overrides,
            source_patches_enabled: true,
        }
    }

    #[test]
    fn test_fallback_namespace_replaces_dashes() {
        assert_eq!(
            fallback_namespace(DEFAULT_FALLBACK_PREFIX, "foo-bar-baz"),
            "fix.namespace.foo_bar_baz"
        );
        assert_eq!(
            fallback_namespace(DEFAULT_FALLBACK_PREFIX, "path_provider"),
            "fix.namespace.path_provider"
        );
    }

    #[test]
    fn test_existing_namespace_is_kept() {
        let mut sub = Subproject::new("foo-bar", "/tmp/foo-bar");
        sub.extension.namespace = Some("dev.foo.bar".to_string());

        NamespaceStep
            .apply(&mut sub, &context(&[]), &DryRunStorage::new())
            .unwrap();

        assert_eq!(sub.extension.namespace.as_deref(), Some("dev.foo.bar"));
    }

    #[test]
    fn test_override_replaces_existing_namespace() {
        let overrides = vec![ProjectOverride {
            project: "flutter_media_metadata".to_string(),
            namespace: Some("com.alexmercerind.flutter_media_metadata".to_string()),
            compile_sdk: Some(34),
            manifest: None,
            source_patches: Vec::new(),
        }];
        let mut sub = Subproject::new("flutter_media_metadata", "/tmp/fmm");
        sub.extension.namespace = Some("something.else".to_string());
        sub.extension.compile_sdk = Some(30);

        NamespaceStep
            .apply(&mut sub, &context(&overrides), &DryRunStorage::new())
            .unwrap();

        assert_eq!(
            sub.extension.namespace.as_deref(),
            Some("com.alexmercerind.flutter_media_metadata")
        );
        assert_eq!(sub.extension.compile_sdk, Some(34));
    }
}
