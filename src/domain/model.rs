use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Artifact repository declared for every project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Repository {
    Google,
    MavenCentral,
    Maven { url: String },
}

/// Settable fields of the library-build plugin extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryExtension {
    pub namespace: Option<String>,
    pub compile_sdk: Option<u32>,
}

impl LibraryExtension {
    /// Fields set in `other` win.
    pub fn overlay(&mut self, other: &LibraryExtension) {
        if other.namespace.is_some() {
            self.namespace.clone_from(&other.namespace);
        }
        if other.compile_sdk.is_some() {
            self.compile_sdk = other.compile_sdk;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subproject {
    pub name: String,
    pub project_dir: PathBuf,
    pub plugins: Vec<String>,
    /// Values the subproject's own build script sets.
    pub declared: LibraryExtension,
    /// Effective values once the patcher has run.
    pub extension: LibraryExtension,
    pub build_dir: Option<PathBuf>,
    pub repositories: Vec<Repository>,
    pub evaluation_depends_on: Vec<String>,
}

impl Subproject {
    pub fn new(name: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            project_dir: project_dir.into(),
            plugins: Vec::new(),
            declared: LibraryExtension::default(),
            extension: LibraryExtension::default(),
            build_dir: None,
            repositories: Vec::new(),
            evaluation_depends_on: Vec::new(),
        }
    }

    pub fn with_plugin(mut self, plugin_id: impl Into<String>) -> Self {
        self.plugins.push(plugin_id.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.declared.namespace = Some(namespace.into());
        self
    }

    pub fn with_compile_sdk(mut self, sdk: u32) -> Self {
        self.declared.compile_sdk = Some(sdk);
        self
    }

    pub fn applies_plugin(&self, plugin_id: &str) -> bool {
        self.plugins.iter().any(|p| p == plugin_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTree {
    pub root_dir: PathBuf,
    pub build_dir: PathBuf,
    pub repositories: Vec<Repository>,
    pub subprojects: Vec<Subproject>,
}

impl ProjectTree {
    /// A tree whose root build directory is `<root_dir>/build`, as Gradle defaults it.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        let root_dir = root_dir.into();
        let build_dir = root_dir.join("build");
        Self {
            root_dir,
            build_dir,
            repositories: Vec::new(),
            subprojects: Vec::new(),
        }
    }

    pub fn with_subproject(mut self, subproject: Subproject) -> Self {
        self.subprojects.push(subproject);
        self
    }

    pub fn subproject(&self, name: &str) -> Option<&Subproject> {
        self.subprojects.iter().find(|s| s.name == name)
    }

    pub fn subproject_mut(&mut self, name: &str) -> Option<&mut Subproject> {
        self.subprojects.iter_mut().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.subprojects.iter().map(|s| s.name.as_str()).collect()
    }
}

/// A filesystem side effect of one run. Paths are absolute or relative to the cwd.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum FileAction {
    Created { path: PathBuf },
    Patched { path: PathBuf, patch: String },
    AlreadyPatched { path: PathBuf, patch: String },
    Unchanged { path: PathBuf },
    Skipped { path: PathBuf, reason: String },
    Removed { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub name: String,
    pub build_dir: Option<PathBuf>,
    pub library: bool,
    pub namespace: Option<String>,
    pub compile_sdk: Option<u32>,
    pub actions: Vec<FileAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchReport {
    pub generated_at: DateTime<Utc>,
    pub dry_run: bool,
    pub root_build_dir: PathBuf,
    pub evaluation_order: Vec<String>,
    pub projects: Vec<ProjectReport>,
}

impl PatchReport {
    pub fn project(&self, name: &str) -> Option<&ProjectReport> {
        self.projects.iter().find(|p| p.name == name)
    }

    pub fn actions(&self) -> impl Iterator<Item = &FileAction> {
        self.projects.iter().flat_map(|p| p.actions.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_keeps_unset_fields() {
        let mut ext = LibraryExtension {
            namespace: Some("a.b".to_string()),
            compile_sdk: Some(33),
        };
        ext.overlay(&LibraryExtension {
            namespace: None,
            compile_sdk: Some(34),
        });
        assert_eq!(ext.namespace.as_deref(), Some("a.b"));
        assert_eq!(ext.compile_sdk, Some(34));
    }

    #[test]
    fn test_applies_plugin() {
        let sub = Subproject::new("foo-bar", "/tmp/foo-bar").with_plugin("com.android.library");
        assert!(sub.applies_plugin("com.android.library"));
        assert!(!sub.applies_plugin("com.android.application"));
    }

    #[test]
    fn test_tree_lookup() {
        let tree = ProjectTree::new("/work/android")
            .with_subproject(Subproject::new("app", "/work/android/app"));
        assert_eq!(tree.build_dir, PathBuf::from("/work/android/build"));
        assert!(tree.subproject("app").is_some());
        assert!(tree.subproject("missing").is_none());
    }
}
