//! Error types for ai-attribution.
//!
//! This module defines all errors that can occur during operation. Hook entry
//! points never surface these to the committer as failures; they are logged and
//! the hook exits successfully.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in ai-attribution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path where config was expected.
        path: PathBuf,
    },

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        /// Description of the parse error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    ConfigInvalid {
        /// Field name that is invalid.
        field: String,
        /// Description of why it's invalid.
        message: String,
    },

    // =========================================================================
    // Rule errors
    // =========================================================================
    /// A detection rule carries a pattern that does not compile.
    #[error("Invalid rule '{tag}' in {set}: {message}")]
    InvalidRule {
        /// Rule set the rule belongs to.
        set: String,
        /// Tag of the offending rule.
        tag: String,
        /// Compiler message.
        message: String,
    },

    // =========================================================================
    // Analysis errors
    // =========================================================================
    /// The language of a file could not be determined.
    #[error("Unrecognized language for {path}")]
    UnsupportedLanguage {
        /// Path of the analyzed file (empty when analyzing bare text).
        path: PathBuf,
    },

    /// The activity log could not be read.
    #[error("Activity log unavailable: {message}")]
    ActivityUnavailable {
        /// Description of what failed.
        message: String,
    },

    // =========================================================================
    // Git errors
    // =========================================================================
    /// Not in a Git repository.
    #[error("Not in a Git repository")]
    NotGitRepo,

    /// Git operation failed.
    #[error("Git operation failed: {operation} - {message}")]
    GitOperation {
        /// Name of the operation that failed.
        operation: String,
        /// Error message.
        message: String,
    },

    // =========================================================================
    // Coordination errors
    // =========================================================================
    /// The attribution flag could not be written or removed.
    #[error("Attribution flag at {path} could not be updated: {message}")]
    Flag {
        /// Path of the flag file.
        path: PathBuf,
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    /// The manual override cannot be set while continuous mode is on.
    #[error("Manual override is disabled while continuous detection mode is on. Run: aia mode manual")]
    OverrideDisabled,

    // =========================================================================
    // Hook errors
    // =========================================================================
    /// Hook already exists and wasn't created by us.
    #[error("Git hook already exists at {path}. Use --force to overwrite.")]
    HookExists {
        /// Path to existing hook.
        path: PathBuf,
    },

    // =========================================================================
    // I/O errors
    // =========================================================================
    /// File I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: serde_json::Error,
    },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Internal error (should never happen).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates a new configuration parse error with source.
    pub fn config_parse_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new invalid configuration error.
    pub fn config_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new I/O error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Creates a new Git operation error.
    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GitOperation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a new flag error.
    pub fn flag(path: impl Into<PathBuf>, message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Flag {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Returns true if this is a user-correctable error, one whose message
    /// alone tells the user what to do.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigInvalid { .. }
                | Self::InvalidRule { .. }
                | Self::NotGitRepo
                | Self::HookExists { .. }
                | Self::OverrideDisabled
        )
    }

    /// Returns an exit code appropriate for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::InvalidRule { .. } => 78, // EX_CONFIG
            Self::NotGitRepo | Self::GitOperation { .. } => 65, // EX_DATAERR
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Display / Error message tests
    // =========================================================================

    #[test]
    fn test_display_config_not_found() {
        let err = Error::ConfigNotFound {
            path: PathBuf::from("/my/ai-attribution.toml"),
        };
        assert_eq!(
            err.to_string(),
            "Configuration file not found: /my/ai-attribution.toml"
        );
    }

    #[test]
    fn test_display_config_invalid() {
        let err = Error::config_invalid("detection.threshold", "must be at most 100");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: detection.threshold - must be at most 100"
        );
    }

    #[test]
    fn test_display_invalid_rule() {
        let err = Error::InvalidRule {
            set: "syntax".to_string(),
            tag: "js-function".to_string(),
            message: "unclosed group".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid rule 'js-function' in syntax: unclosed group"
        );
    }

    #[test]
    fn test_display_git_operation() {
        let err = Error::git("diff --cached", "bad revision");
        assert_eq!(
            err.to_string(),
            "Git operation failed: diff --cached - bad revision"
        );
    }

    #[test]
    fn test_display_flag() {
        let err = Error::flag(
            "/repo/.git/ai-attribution/attribution.flag",
            "remove",
            std::io::Error::other("permission denied"),
        );
        assert!(err.to_string().contains("attribution.flag"));
        assert!(err.to_string().contains("remove"));
    }

    #[test]
    fn test_display_override_disabled() {
        assert!(Error::OverrideDisabled
            .to_string()
            .contains("continuous detection mode"));
    }

    #[test]
    fn test_display_hook_exists() {
        let err = Error::HookExists {
            path: PathBuf::from(".git/hooks/post-commit"),
        };
        assert_eq!(
            err.to_string(),
            "Git hook already exists at .git/hooks/post-commit. Use --force to overwrite."
        );
    }

    fn parse_error() -> Error {
        Error::ConfigParse {
            message: "x".into(),
            source: None,
        }
    }

    // =========================================================================
    // Exit code tests
    // =========================================================================

    #[test]
    fn test_exit_codes() {
        assert_eq!(parse_error().exit_code(), 78);
        assert_eq!(Error::config_invalid("x", "y").exit_code(), 78);
        assert_eq!(Error::NotGitRepo.exit_code(), 65);
        assert_eq!(Error::git("op", "msg").exit_code(), 65);
        assert_eq!(Error::OverrideDisabled.exit_code(), 1);
        assert_eq!(
            Error::Internal {
                message: "x".into()
            }
            .exit_code(),
            1
        );
    }

    // =========================================================================
    // is_user_error tests
    // =========================================================================

    #[test]
    fn test_is_user_error() {
        assert!(Error::NotGitRepo.is_user_error());
        assert!(Error::OverrideDisabled.is_user_error());
        assert!(Error::config_invalid("x", "y").is_user_error());
        assert!(!parse_error().is_user_error());
        assert!(!Error::git("op", "msg").is_user_error());
        assert!(!Error::io("x", std::io::Error::other("y")).is_user_error());
    }

    // =========================================================================
    // Error source chain tests
    // =========================================================================

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as StdError;
        let err = Error::io("x", std::io::Error::other("inner"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_config_parse_with_source_has_source() {
        use std::error::Error as StdError;
        let toml_err = toml::from_str::<toml::Value>("bad").expect_err("should fail");
        let err = Error::config_parse_with_source("msg", toml_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_serialization_has_source() {
        use std::error::Error as StdError;
        let json_err = serde_json::from_str::<serde_json::Value>("{").expect_err("should fail");
        let err = Error::serialization("decode", json_err);
        assert!(err.source().is_some());
    }
}
