use crate::app::steps::namespace::DEFAULT_FALLBACK_PREFIX;
use crate::core::layout::DEFAULT_RELOCATION;
use crate::core::text_patch::TextPatch;
use crate::domain::model::Repository;
use crate::utils::error::{PatchError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_project_name, validate_range,
    validate_relative_path, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const LIBRARY_PLUGIN_ID: &str = "com.android.library";
pub const MEDIA_METADATA_PROJECT: &str = "flutter_media_metadata";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatcherConfig {
    #[serde(default)]
    pub patcher: PatcherSettings,
    #[serde(default)]
    pub project: ProjectSettings,
    #[serde(default = "default_overrides")]
    pub overrides: Vec<ProjectOverride>,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            patcher: PatcherSettings::default(),
            project: ProjectSettings::default(),
            overrides: default_overrides(),
        }
    }
}

/// Which of the two root-script flavours to reproduce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatcherVariant {
    /// Patcher runs after the subproject's own script, so forced values win.
    #[default]
    AfterEvaluate,
    /// Patcher runs when the plugin is applied; the subproject's script can still override.
    Immediate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatcherSettings {
    #[serde(default)]
    pub variant: PatcherVariant,
    #[serde(default = "default_true")]
    pub source_patches: bool,
    #[serde(default = "default_relocation")]
    pub relocated_build_dir: String,
    #[serde(default = "default_library_plugin")]
    pub library_plugin: String,
    /// Every other subproject evaluates after this one. Empty disables the constraint.
    #[serde(default = "default_anchor")]
    pub evaluation_anchor: String,
    #[serde(default = "default_fallback_prefix")]
    pub fallback_prefix: String,
    #[serde(default = "default_repositories")]
    pub repositories: Vec<Repository>,
}

impl PatcherSettings {
    pub fn anchor(&self) -> Option<&str> {
        Some(self.evaluation_anchor.as_str()).filter(|a| !a.is_empty())
    }
}

impl Default for PatcherSettings {
    fn default() -> Self {
        Self {
            variant: PatcherVariant::default(),
            source_patches: true,
            relocated_build_dir: default_relocation(),
            library_plugin: default_library_plugin(),
            evaluation_anchor: default_anchor(),
            fallback_prefix: default_fallback_prefix(),
            repositories: default_repositories(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// The Gradle root, i.e. the Flutter project's `android/` directory.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    /// Relative to `root_dir`.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
    /// Read `settings.gradle(.kts)` and subproject build files.
    #[serde(default = "default_true")]
    pub discover: bool,
    #[serde(default)]
    pub subprojects: Vec<SubprojectDefinition>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            build_dir: default_build_dir(),
            discover: true,
            subprojects: Vec::new(),
        }
    }
}

/// Explicit subproject entry; merged over whatever discovery found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubprojectDefinition {
    pub name: String,
    /// Relative to `root_dir`; defaults to `<root_dir>/<name>`.
    pub dir: Option<String>,
    #[serde(default)]
    pub plugins: Vec<String>,
    pub namespace: Option<String>,
    pub compile_sdk: Option<u32>,
    #[serde(default)]
    pub evaluation_depends_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOverride {
    pub project: String,
    pub namespace: Option<String>,
    pub compile_sdk: Option<u32>,
    /// Created when missing, relative to the subproject directory.
    pub manifest: Option<String>,
    #[serde(default)]
    pub source_patches: Vec<TextPatch>,
}

fn default_true() -> bool {
    true
}

fn default_relocation() -> String {
    DEFAULT_RELOCATION.to_string()
}

fn default_library_plugin() -> String {
    LIBRARY_PLUGIN_ID.to_string()
}

fn default_anchor() -> String {
    "app".to_string()
}

fn default_fallback_prefix() -> String {
    DEFAULT_FALLBACK_PREFIX.to_string()
}

fn default_repositories() -> Vec<Repository> {
    vec![Repository::Google, Repository::MavenCentral]
}

fn default_root_dir() -> String {
    ".".to_string()
}

fn default_build_dir() -> String {
    "build".to_string()
}

/// The flutter_media_metadata fix: namespace, SDK 34, manifest and the release() guard.
pub fn default_overrides() -> Vec<ProjectOverride> {
    vec![ProjectOverride {
        project: MEDIA_METADATA_PROJECT.to_string(),
        namespace: Some("com.alexmercerind.flutter_media_metadata".to_string()),
        compile_sdk: Some(34),
        manifest: Some("src/main/AndroidManifest.xml".to_string()),
        source_patches: vec![TextPatch {
            id: "media-retriever-release-ioexception".to_string(),
            version: 1,
            file: "src/main/java/com/alexmercerind/flutter_media_metadata/FlutterMediaMetadataPlugin.java"
                .to_string(),
            match_pattern: "retriever.release();".to_string(),
            guard_pattern: "try { retriever.release();".to_string(),
            replacement:
                "try { retriever.release(); } catch (java.io.IOException e) { e.printStackTrace(); }"
                    .to_string(),
        }],
    }]
}

impl PatcherConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| PatchError::io(path.as_ref(), e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PatchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PatchError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn override_for(&self, project: &str) -> Option<&ProjectOverride> {
        self.overrides.iter().find(|o| o.project == project)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("patcher.relocated_build_dir", &self.patcher.relocated_build_dir)?;
        validate_non_empty_string("patcher.library_plugin", &self.patcher.library_plugin)?;
        validate_non_empty_string("patcher.fallback_prefix", &self.patcher.fallback_prefix)?;
        if let Some(anchor) = self.patcher.anchor() {
            validate_project_name("patcher.evaluation_anchor", anchor)?;
        }

        validate_path("project.root_dir", &self.project.root_dir)?;
        validate_path("project.build_dir", &self.project.build_dir)?;

        let mut seen = HashSet::new();
        for sub in &self.project.subprojects {
            validate_project_name("project.subprojects.name", &sub.name)?;
            if !seen.insert(sub.name.as_str()) {
                return Err(PatchError::InvalidConfigValueError {
                    field: "project.subprojects.name".to_string(),
                    value: sub.name.clone(),
                    reason: "Subproject declared twice".to_string(),
                });
            }
            if let Some(dir) = &sub.dir {
                validate_path("project.subprojects.dir", dir)?;
            }
        }

        let mut seen = HashSet::new();
        for forced in &self.overrides {
            validate_project_name("overrides.project", &forced.project)?;
            if !seen.insert(forced.project.as_str()) {
                return Err(PatchError::InvalidConfigValueError {
                    field: "overrides.project".to_string(),
                    value: forced.project.clone(),
                    reason: "Only one override per project is allowed".to_string(),
                });
            }
            if let Some(namespace) = &forced.namespace {
                validate_non_empty_string("overrides.namespace", namespace)?;
            }
            if let Some(sdk) = forced.compile_sdk {
                validate_range("overrides.compile_sdk", sdk, 1, 100)?;
            }
            if let Some(manifest) = &forced.manifest {
                validate_relative_path("overrides.manifest", manifest)?;
            }
            for patch in &forced.source_patches {
                patch.validate()?;
            }
        }

        Ok(())
    }
}

impl Validate for PatcherConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
