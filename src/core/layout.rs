use crate::domain::model::ProjectTree;
use std::path::{Component, Path, PathBuf};

/// Where Flutter expects Android outputs: the Flutter project's own `build/`.
pub const DEFAULT_RELOCATION: &str = "../../build";

/// Resolves `..` and `.` without touching the filesystem. `..` never climbs above a root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

pub fn relocated_build_dir(root_build_dir: &Path, relative: &Path) -> PathBuf {
    normalize_lexically(&root_build_dir.join(relative))
}

pub fn subproject_build_dir(base: &Path, name: &str) -> PathBuf {
    base.join(name)
}

/// Points the root and every subproject at the relocated base. Plugin membership is irrelevant here.
pub fn relocate_build_dirs(tree: &mut ProjectTree, relative: &Path) -> PathBuf {
    let base = relocated_build_dir(&tree.build_dir, relative);
    tracing::debug!(
        "relocating root build dir {} -> {}",
        tree.build_dir.display(),
        base.display()
    );
    tree.build_dir = base.clone();

    for subproject in &mut tree.subprojects {
        subproject.build_dir = Some(subproject_build_dir(&base, &subproject.name));
    }
    base
}
