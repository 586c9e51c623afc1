use crate::app::steps::{default_steps, StepContext};
use crate::config::toml_config::{PatcherConfig, PatcherVariant};
use crate::core::clean::clean;
use crate::core::evaluation::evaluation_order;
use crate::core::layout::{relocate_build_dirs, relocated_build_dir};
use crate::domain::model::{
    FileAction, LibraryExtension, PatchReport, ProjectReport, ProjectTree, Subproject,
};
use crate::domain::ports::{ProjectStep, Storage};
use crate::utils::error::{PatchError, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Applies the root build configuration to a project tree, once per invocation.
pub struct BuildPatcher<S: Storage> {
    storage: S,
    config: PatcherConfig,
    steps: Vec<Box<dyn ProjectStep>>,
    dry_run: bool,
}

impl<S: Storage> BuildPatcher<S> {
    pub fn new(storage: S, config: PatcherConfig) -> Self {
        Self {
            storage,
            config,
            steps: default_steps(),
            dry_run: false,
        }
    }

    /// Marks reports as dry runs. Pair with a storage that does not write.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Relocated root build dir for a tree that has not been relocated yet.
    pub fn relocated_root(&self, tree: &ProjectTree) -> PathBuf {
        relocated_build_dir(
            &tree.build_dir,
            Path::new(&self.config.patcher.relocated_build_dir),
        )
    }

    pub fn run(&self, tree: &mut ProjectTree) -> Result<PatchReport> {
        let settings = &self.config.patcher;
        tracing::info!(
            "patching {} subprojects under {} ({:?})",
            tree.subprojects.len(),
            tree.root_dir.display(),
            settings.variant
        );

        tree.repositories.clone_from(&settings.repositories);
        for subproject in &mut tree.subprojects {
            subproject.repositories.clone_from(&settings.repositories);
        }

        let root_build_dir =
            relocate_build_dirs(tree, Path::new(&settings.relocated_build_dir));
        let order = evaluation_order(tree, settings.anchor())?;

        let context = StepContext {
            fallback_prefix: &settings.fallback_prefix,
            overrides: &self.config.overrides,
            source_patches_enabled: settings.source_patches,
        };

        let mut projects = Vec::with_capacity(order.len());
        for name in &order {
            let subproject = tree
                .subproject_mut(name)
                .ok_or_else(|| PatchError::UnknownProject { name: name.clone() })?;
            projects.push(self.configure(subproject, &context)?);
        }

        Ok(PatchReport {
            generated_at: Utc::now(),
            dry_run: self.dry_run,
            root_build_dir,
            evaluation_order: order,
            projects,
        })
    }

    fn configure(&self, subproject: &mut Subproject, context: &StepContext) -> Result<ProjectReport> {
        let settings = &self.config.patcher;
        let library = subproject.applies_plugin(&settings.library_plugin);
        let mut actions = Vec::new();

        if !library {
            tracing::debug!("{}: no {}, skipping", subproject.name, settings.library_plugin);
            subproject.extension = subproject.declared.clone();
        } else {
            match settings.variant {
                PatcherVariant::AfterEvaluate => {
                    subproject.extension = subproject.declared.clone();
                    actions = self.run_steps(subproject, context)?;
                }
                PatcherVariant::Immediate => {
                    subproject.extension = LibraryExtension::default();
                    actions = self.run_steps(subproject, context)?;
                    let declared = subproject.declared.clone();
                    subproject.extension.overlay(&declared);
                }
            }
        }

        Ok(ProjectReport {
            name: subproject.name.clone(),
            build_dir: subproject.build_dir.clone(),
            library,
            namespace: subproject.extension.namespace.clone(),
            compile_sdk: subproject.extension.compile_sdk,
            actions,
        })
    }

    fn run_steps(&self, subproject: &mut Subproject, context: &StepContext) -> Result<Vec<FileAction>> {
        let mut actions = Vec::new();
        for step in &self.steps {
            if !step.should_apply(subproject, context) {
                continue;
            }
            tracing::debug!("{}: running step {}", subproject.name, step.name());
            actions.extend(step.apply(subproject, context, &self.storage)?);
        }
        Ok(actions)
    }

    /// Deletes the relocated build tree of a freshly loaded (not yet relocated) tree.
    pub fn clean(&self, tree: &ProjectTree) -> Result<FileAction> {
        clean(&self.storage, &self.relocated_root(tree))
    }
}
