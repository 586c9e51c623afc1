use crate::utils::error::{PatchError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Paths that must stay inside a subproject directory.
pub fn validate_relative_path(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    let candidate = std::path::Path::new(path);
    let escapes = candidate.is_absolute()
        || candidate
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));
    if escapes {
        return Err(PatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path must be relative to the subproject directory".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Gradle project names end up in directory names and namespaces.
pub fn validate_project_name(field_name: &str, name: &str) -> Result<()> {
    validate_non_empty_string(field_name, name)?;
    if name.contains(['/', '\\', ':']) {
        return Err(PatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Project names cannot contain path separators or ':'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("project.root_dir", ".").is_ok());
        assert!(validate_path("project.root_dir", "").is_err());
        assert!(validate_path("project.root_dir", "a\0b").is_err());
    }

    #[test]
    fn test_validate_relative_path() {
        assert!(validate_relative_path("manifest", "src/main/AndroidManifest.xml").is_ok());
        assert!(validate_relative_path("manifest", "../outside.xml").is_err());
        assert!(validate_relative_path("manifest", "/etc/passwd").is_err());
    }

    #[test]
    fn test_validate_project_name() {
        assert!(validate_project_name("project", "foo-bar").is_ok());
        assert!(validate_project_name("project", ":app").is_err());
        assert!(validate_project_name("project", "  ").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("compile_sdk", 34, 1, 100).is_ok());
        assert!(validate_range("compile_sdk", 0, 1, 100).is_err());
    }
}
