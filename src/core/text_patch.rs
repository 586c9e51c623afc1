//! Idempotent textual patches for third-party plugin sources.
//!
//! A [`TextPatch`] rewrites every occurrence of `match_pattern` into
//! `replacement`, unless `guard_pattern` is already in the text. The
//! replacement must itself contain the guard, which is what makes a second
//! application a no-op.

use crate::domain::model::FileAction;
use crate::domain::ports::Storage;
use crate::utils::error::{PatchError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_relative_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPatch {
    pub id: String,
    #[serde(default = "default_version")]
    pub version: u32,
    /// Relative to the subproject directory.
    pub file: String,
    #[serde(rename = "match")]
    pub match_pattern: String,
    #[serde(rename = "guard")]
    pub guard_pattern: String,
    pub replacement: String,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied(String),
    AlreadyApplied,
    NotApplicable,
}

impl TextPatch {
    /// `id@version`, used in reports and logs.
    pub fn label(&self) -> String {
        format!("{}@{}", self.id, self.version)
    }

    pub fn apply_to(&self, text: &str) -> PatchOutcome {
        if text.contains(&self.guard_pattern) {
            return PatchOutcome::AlreadyApplied;
        }
        if !text.contains(&self.match_pattern) {
            return PatchOutcome::NotApplicable;
        }
        PatchOutcome::Applied(text.replace(&self.match_pattern, &self.replacement))
    }

    /// Missing files are skipped, never an error.
    pub fn apply_to_file(&self, storage: &dyn Storage, project_dir: &Path) -> Result<FileAction> {
        let path = project_dir.join(&self.file);
        if !storage.exists(&path) {
            tracing::debug!("patch {} skipped, {} is absent", self.label(), path.display());
            return Ok(FileAction::Skipped {
                path,
                reason: "file not found".to_string(),
            });
        }

        let content = storage.read_to_string(&path)?;
        match self.apply_to(&content) {
            PatchOutcome::Applied(patched) => {
                storage.write(&path, &patched)?;
                tracing::info!("applied patch {} to {}", self.label(), path.display());
                Ok(FileAction::Patched {
                    path,
                    patch: self.label(),
                })
            }
            PatchOutcome::AlreadyApplied => Ok(FileAction::AlreadyPatched {
                path,
                patch: self.label(),
            }),
            PatchOutcome::NotApplicable => Ok(FileAction::Skipped {
                path,
                reason: format!("pattern for {} not found", self.label()),
            }),
        }
    }
}

impl Validate for TextPatch {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("source_patches.id", &self.id)?;
        validate_relative_path("source_patches.file", &self.file)?;
        validate_non_empty_string("source_patches.match", &self.match_pattern)?;
        validate_non_empty_string("source_patches.guard", &self.guard_pattern)?;

        if !self.replacement.contains(&self.guard_pattern) {
            return Err(PatchError::ConfigValidationError {
                field: format!("source_patches.{}", self.id),
                message: "replacement must contain the guard, otherwise the patch is not idempotent"
                    .to_string(),
            });
        }
        Ok(())
    }
}

/// Applies `patches` in order; returns the final text and which patches changed it.
pub fn apply_patches(patches: &[TextPatch], text: &str) -> (String, Vec<String>) {
    let mut current = text.to_string();
    let mut applied = Vec::new();
    for patch in patches {
        if let PatchOutcome::Applied(next) = patch.apply_to(&current) {
            current = next;
            applied.push(patch.label());
        }
    }
    (current, applied)
}
