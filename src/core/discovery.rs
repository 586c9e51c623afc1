//! Builds a [`ProjectTree`] from a Gradle root on disk.
//!
//! Subprojects come from three places, later ones winning on name clashes:
//! `include` entries in `settings.gradle(.kts)`, the Android section of the
//! Flutter tool's `.flutter-plugins-dependencies` file next to the Gradle
//! root, and explicit `[[project.subprojects]]` entries from the patcher
//! config. Build scripts are scanned, not evaluated, for plugin ids and
//! literal `namespace`/`compileSdk` assignments.

use crate::config::toml_config::{ProjectSettings, SubprojectDefinition};
use crate::domain::model::{ProjectTree, Subproject};
use crate::domain::ports::Storage;
use crate::utils::error::{PatchError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const SETTINGS_FILES: [&str; 2] = ["settings.gradle.kts", "settings.gradle"];
const BUILD_FILES: [&str; 2] = ["build.gradle.kts", "build.gradle"];
const FLUTTER_PLUGINS_FILE: &str = ".flutter-plugins-dependencies";

#[derive(Debug, Deserialize)]
struct FlutterPluginsDependencies {
    #[serde(default)]
    plugins: FlutterPlugins,
}

#[derive(Debug, Default, Deserialize)]
struct FlutterPlugins {
    #[serde(default)]
    android: Vec<FlutterPlugin>,
}

#[derive(Debug, Deserialize)]
struct FlutterPlugin {
    name: String,
    path: String,
    #[serde(default = "default_native_build")]
    native_build: bool,
}

fn default_native_build() -> bool {
    true
}

/// What a build script says about itself.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildScriptFacts {
    pub plugins: Vec<String>,
    pub namespace: Option<String>,
    pub compile_sdk: Option<u32>,
}

fn regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| PatchError::ConfigValidationError {
        field: "discovery".to_string(),
        message: e.to_string(),
    })
}

/// Included project names with their directories relative to the root, in declaration order.
///
/// A nested path such as `:libs:foo` yields the project `foo` in `libs/foo`,
/// unless a `projectDir` remap says otherwise.
pub fn parse_settings(content: &str) -> Result<Vec<(String, Option<String>)>> {
    let include = regex(
        r#"(?m)^\s*include\b\s*\(?\s*((?:["'][^"']+["'])(?:\s*,\s*["'][^"']+["'])*)"#,
    )?;
    let quoted = regex(r#"["']([^"']+)["']"#)?;
    let project_dir = regex(
        r#"project\(\s*["']:?([^"']+)["']\s*\)\.projectDir\s*=\s*(?:new\s+File|file)\(\s*(?:rootProject\.projectDir\s*,\s*|rootDir\s*,\s*)?["']([^"']+)["']\s*\)"#,
    )?;

    // (gradle path without the leading ':', name, dir)
    let mut projects: Vec<(String, String, Option<String>)> = Vec::new();
    for statement in include.captures_iter(content) {
        for entry in quoted.captures_iter(&statement[1]) {
            let path = entry[1].trim_start_matches(':').to_string();
            let segments: Vec<&str> = path.split(':').filter(|s| !s.is_empty()).collect();
            let Some(name) = segments.last().map(|s| s.to_string()) else {
                continue;
            };
            if projects.iter().any(|(p, _, _)| *p == path) {
                continue;
            }
            let dir = (segments.len() > 1).then(|| segments.join("/"));
            projects.push((path, name, dir));
        }
    }

    for remap in project_dir.captures_iter(content) {
        if let Some(entry) = projects.iter_mut().find(|(p, _, _)| *p == remap[1]) {
            entry.2 = Some(remap[2].to_string());
        }
    }

    Ok(projects
        .into_iter()
        .map(|(_, name, dir)| (name, dir))
        .collect())
}

pub fn parse_build_script(content: &str) -> Result<BuildScriptFacts> {
    let plugin_id = regex(r#"\bid\s*\(?\s*["']([\w.\-]+)["']"#)?;
    let apply_plugin = regex(r#"apply\s*\(?\s*plugin\s*[:=]\s*["']([\w.\-]+)["']"#)?;
    let namespace = regex(r#"(?m)^\s*namespace\s*=?\s*["']([^"']+)["']"#)?;
    let compile_sdk = regex(r"(?m)^\s*compileSdk(?:Version)?\s*=?\s*(\d+)\b")?;

    let mut facts = BuildScriptFacts::default();
    for caps in plugin_id
        .captures_iter(content)
        .chain(apply_plugin.captures_iter(content))
    {
        let id = caps[1].to_string();
        if !facts.plugins.contains(&id) {
            facts.plugins.push(id);
        }
    }
    facts.namespace = namespace.captures(content).map(|c| c[1].to_string());
    facts.compile_sdk = compile_sdk
        .captures(content)
        .and_then(|c| c[1].parse().ok());
    Ok(facts)
}

fn read_first(storage: &dyn Storage, dir: &Path, candidates: &[&str]) -> Result<Option<String>> {
    for candidate in candidates {
        let path = dir.join(candidate);
        if storage.exists(&path) {
            return storage.read_to_string(&path).map(Some);
        }
    }
    Ok(None)
}

fn flutter_plugins(storage: &dyn Storage, root_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let path = root_dir.join("..").join(FLUTTER_PLUGINS_FILE);
    if !storage.exists(&path) {
        return Ok(Vec::new());
    }
    let parsed: FlutterPluginsDependencies =
        serde_json::from_str(&storage.read_to_string(&path)?).map_err(|e| {
            PatchError::ConfigValidationError {
                field: FLUTTER_PLUGINS_FILE.to_string(),
                message: e.to_string(),
            }
        })?;

    Ok(parsed
        .plugins
        .android
        .into_iter()
        .filter(|p| p.native_build)
        .map(|p| (p.name, PathBuf::from(p.path).join("android")))
        .collect())
}

fn upsert<'a>(tree: &'a mut ProjectTree, name: &str, dir: PathBuf) -> &'a mut Subproject {
    let index = match tree.subprojects.iter().position(|s| s.name == name) {
        Some(i) => {
            tree.subprojects[i].project_dir = dir;
            i
        }
        None => {
            tree.subprojects.push(Subproject::new(name, dir));
            tree.subprojects.len() - 1
        }
    };
    &mut tree.subprojects[index]
}

fn apply_definition(tree: &mut ProjectTree, definition: &SubprojectDefinition) {
    let root = tree.root_dir.clone();
    let existing_dir = tree.subproject(&definition.name).map(|s| s.project_dir.clone());
    let dir = match (&definition.dir, existing_dir) {
        (Some(dir), _) => root.join(dir),
        (None, Some(existing)) => existing,
        (None, None) => root.join(&definition.name),
    };

    let sub = upsert(tree, &definition.name, dir);
    for plugin in &definition.plugins {
        if !sub.applies_plugin(plugin) {
            sub.plugins.push(plugin.clone());
        }
    }
    if definition.namespace.is_some() {
        sub.declared.namespace.clone_from(&definition.namespace);
    }
    if definition.compile_sdk.is_some() {
        sub.declared.compile_sdk = definition.compile_sdk;
    }
    for dep in &definition.evaluation_depends_on {
        if !sub.evaluation_depends_on.contains(dep) {
            sub.evaluation_depends_on.push(dep.clone());
        }
    }
}

/// `root_dir` overrides `settings.root_dir` when given.
pub fn load_project_tree(
    settings: &ProjectSettings,
    root_dir: Option<&Path>,
    storage: &dyn Storage,
) -> Result<ProjectTree> {
    let root = root_dir.map_or_else(|| PathBuf::from(&settings.root_dir), Path::to_path_buf);
    let mut tree = ProjectTree::new(root.clone());
    tree.build_dir = root.join(&settings.build_dir);

    if settings.discover {
        if let Some(content) = read_first(storage, &root, &SETTINGS_FILES)? {
            for (name, dir) in parse_settings(&content)? {
                let dir = dir.map_or_else(|| root.join(&name), |d| root.join(d));
                upsert(&mut tree, &name, dir);
            }
        } else {
            tracing::warn!("no settings.gradle found under {}", root.display());
        }

        for (name, dir) in flutter_plugins(storage, &root)? {
            upsert(&mut tree, &name, dir);
        }

        for sub in &mut tree.subprojects {
            if let Some(script) = read_first(storage, &sub.project_dir, &BUILD_FILES)? {
                let facts = parse_build_script(&script)?;
                sub.plugins = facts.plugins;
                sub.declared.namespace = facts.namespace;
                sub.declared.compile_sdk = facts.compile_sdk;
            }
        }
    }

    for definition in &settings.subprojects {
        apply_definition(&mut tree, definition);
    }

    tracing::debug!(
        "project tree at {} has {} subprojects",
        tree.root_dir.display(),
        tree.subprojects.len()
    );
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_groovy_and_kotlin_settings() {
        let groovy = "include ':app', ':foo-bar'\nproject(':foo-bar').projectDir = new File(rootProject.projectDir, '../packages/foo-bar/android')\n";
        assert_eq!(
            parse_settings(groovy).unwrap(),
            vec![
                ("app".to_string(), None),
                (
                    "foo-bar".to_string(),
                    Some("../packages/foo-bar/android".to_string())
                ),
            ]
        );

        let kotlin = "pluginManagement { }\ninclude(\":app\")\ninclude(\":a\", \":b\")\n";
        let names: Vec<String> = parse_settings(kotlin)
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["app", "a", "b"]);
    }

    #[test]
    fn test_parse_nested_include_paths() {
        let settings = "include ':libs:foo', ':c'\nproject(':c').projectDir = file('../c/android')\n";
        assert_eq!(
            parse_settings(settings).unwrap(),
            vec![
                ("foo".to_string(), Some("libs/foo".to_string())),
                ("c".to_string(), Some("../c/android".to_string())),
            ]
        );

        let remapped = "include(\":libs:foo\")\nproject(\":libs:foo\").projectDir = file(\"vendor/foo\")\n";
        assert_eq!(
            parse_settings(remapped).unwrap(),
            vec![("foo".to_string(), Some("vendor/foo".to_string()))]
        );
    }

    #[test]
    fn test_parse_include_continued_on_next_line() {
        let groovy = "include ':app',\n        ':foo-bar'\n\nrootProject.name = 'my_app'\n";
        let names: Vec<String> = parse_settings(groovy)
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["app", "foo-bar"]);

        let kotlin = "include(\n    \":app\",\n    \":foo-bar\",\n)\n";
        let names: Vec<String> = parse_settings(kotlin)
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["app", "foo-bar"]);
    }

    #[test]
    fn test_parse_build_script_groovy() {
        let script = r#"
apply plugin: 'com.android.library'

android {
    if (project.android.hasProperty("namespace")) {
        namespace 'com.example.foo'
    }
    compileSdkVersion 33
}
"#;
        let facts = parse_build_script(script).unwrap();
        assert_eq!(facts.plugins, vec!["com.android.library"]);
        assert_eq!(facts.namespace.as_deref(), Some("com.example.foo"));
        assert_eq!(facts.compile_sdk, Some(33));
    }

    #[test]
    fn test_parse_build_script_kotlin_without_namespace() {
        let script = "plugins {\n    id(\"com.android.library\")\n    id(\"kotlin-android\")\n}\nandroid {\n    compileSdk = 34\n}\n";
        let facts = parse_build_script(script).unwrap();
        assert_eq!(facts.plugins, vec!["com.android.library", "kotlin-android"]);
        assert_eq!(facts.namespace, None);
        assert_eq!(facts.compile_sdk, Some(34));
    }

    #[test]
    fn test_load_tree_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let flutter_root = temp_dir.path().join("my_app");
        let android = flutter_root.join("android");
        let pub_cache = temp_dir.path().join("pub/flutter_media_metadata-1.0.0");

        fs::create_dir_all(android.join("app")).unwrap();
        fs::create_dir_all(pub_cache.join("android")).unwrap();
        fs::write(android.join("settings.gradle.kts"), "include(\":app\")\n").unwrap();
        fs::write(
            android.join("app/build.gradle.kts"),
            "plugins { id(\"com.android.application\") }\nandroid {\n    namespace = \"com.example.my_app\"\n}\n",
        )
        .unwrap();
        fs::write(
            pub_cache.join("android/build.gradle"),
            "apply plugin: 'com.android.library'\n",
        )
        .unwrap();
        let deps = serde_json::json!({
            "plugins": {
                "android": [
                    { "name": "flutter_media_metadata", "path": pub_cache.to_str().unwrap(), "dependencies": [] },
                    { "name": "dart_only", "path": "/nowhere", "native_build": false }
                ]
            }
        });
        fs::write(flutter_root.join(".flutter-plugins-dependencies"), deps.to_string()).unwrap();

        let settings = ProjectSettings {
            root_dir: android.to_str().unwrap().to_string(),
            ..ProjectSettings::default()
        };
        let tree = load_project_tree(&settings, None, &LocalStorage::new()).unwrap();

        assert_eq!(tree.names(), vec!["app", "flutter_media_metadata"]);
        let app = tree.subproject("app").unwrap();
        assert_eq!(app.declared.namespace.as_deref(), Some("com.example.my_app"));
        assert!(!app.applies_plugin("com.android.library"));
        let fmm = tree.subproject("flutter_media_metadata").unwrap();
        assert_eq!(fmm.project_dir, pub_cache.join("android"));
        assert!(fmm.applies_plugin("com.android.library"));
        assert_eq!(tree.build_dir, android.join("build"));
    }

    #[test]
    fn test_explicit_definitions_without_discovery() {
        let settings = ProjectSettings {
            root_dir: "/work/android".to_string(),
            discover: false,
            subprojects: vec![SubprojectDefinition {
                name: "foo-bar".to_string(),
                dir: None,
                plugins: vec!["com.android.library".to_string()],
                namespace: None,
                compile_sdk: Some(33),
                evaluation_depends_on: Vec::new(),
            }],
            ..ProjectSettings::default()
        };
        let tree = load_project_tree(&settings, None, &LocalStorage::new()).unwrap();

        let sub = tree.subproject("foo-bar").unwrap();
        assert_eq!(sub.project_dir, PathBuf::from("/work/android/foo-bar"));
        assert_eq!(sub.declared.compile_sdk, Some(33));
        assert!(sub.applies_plugin("com.android.library"));
    }
}
