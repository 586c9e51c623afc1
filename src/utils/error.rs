use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("IO error at {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove build directory {}: {source}", .path.display())]
    CleanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Project '{name}' not found in the project tree")]
    UnknownProject { name: String },

    #[error("Evaluation order contains a cycle through: {}", .projects.join(", "))]
    EvaluationCycle { projects: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    ProjectGraph,
    FileSystem,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PatchError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError { .. } | Self::CleanFailed { .. } => ErrorCategory::FileSystem,
            Self::SerializationError(_) => ErrorCategory::Output,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::UnknownProject { .. } | Self::EvaluationCycle { .. } => {
                ErrorCategory::ProjectGraph
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SerializationError(_) => ErrorSeverity::Medium,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::UnknownProject { .. }
            | Self::EvaluationCycle { .. } => ErrorSeverity::High,
            Self::IoError { .. } | Self::CleanFailed { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::IoError { path, .. } => format!(
                "Check that {} is readable and writable by the current user",
                path.display()
            ),
            Self::CleanFailed { path, .. } => format!(
                "Make sure no running Gradle daemon or IDE holds files under {}",
                path.display()
            ),
            Self::SerializationError(_) => "Retry without --json".to_string(),
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Fix the patcher configuration file and run again".to_string()
            }
            Self::UnknownProject { name } => format!(
                "Include ':{}' in settings.gradle or change patcher.evaluation_anchor",
                name
            ),
            Self::EvaluationCycle { .. } => {
                "Remove one of the evaluation_depends_on entries forming the cycle".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::ProjectGraph => format!("Project graph problem: {}", self),
            ErrorCategory::FileSystem => format!("File system problem: {}", self),
            ErrorCategory::Output => format!("Could not write the report: {}", self),
        }
    }
}

impl ErrorSeverity {
    /// Process exit code for a run that failed with this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, PatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_failure_is_critical() {
        let err = PatchError::CleanFailed {
            path: PathBuf::from("/tmp/build"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.category(), ErrorCategory::FileSystem);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("/tmp/build"));
        assert_eq!(err.severity().exit_code(), 3);
    }

    #[test]
    fn test_every_failure_exits_non_zero() {
        let errors = [
            PatchError::io("/tmp/x", std::io::Error::new(std::io::ErrorKind::Other, "boom")),
            PatchError::UnknownProject {
                name: "app".to_string(),
            },
            PatchError::ConfigValidationError {
                field: "patcher.variant".to_string(),
                message: "bad".to_string(),
            },
            PatchError::SerializationError(
                serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
            ),
        ];
        let codes: Vec<i32> = errors.iter().map(|e| e.severity().exit_code()).collect();
        assert_eq!(codes, vec![3, 1, 1, 2]);
    }

    #[test]
    fn test_cycle_message_lists_projects() {
        let err = PatchError::EvaluationCycle {
            projects: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Evaluation order contains a cycle through: a, b");
        assert!(err.user_friendly_message().starts_with("Project graph problem"));
    }
}
