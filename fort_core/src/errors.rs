//! # Error Types
//!
//! Structured error types for fort_core. Every failure is a deterministic
//! function of the input and the current store state, so nothing here is
//! retried automatically.
//!
//! Structural warnings (a wall taller than its thickness supports) are not
//! errors; they ride along on a successful [`CostBreakdown`](crate::calculations::CostBreakdown).
//!
//! ## Example
//!
//! ```rust
//! use fort_core::errors::{FortError, FortResult};
//!
//! fn validate_size(size_ft: u32) -> FortResult<()> {
//!     if size_ft == 0 {
//!         return Err(FortError::invalid_input(
//!             "size_ft",
//!             size_ft.to_string(),
//!             "Footprint must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for fort_core operations
pub type FortResult<T> = Result<T, FortError>;

/// Maximum number of suggestions carried by an ambiguous-name error
pub const MAX_SUGGESTIONS: usize = 8;

/// Structured error type for planning and estimation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum FortError {
    /// An input value is invalid (bad shape, thickness, material, multiplier...)
    ///
    /// `field` names the offending floor when there is one, e.g. `floors[2].thickness_ft`.
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The plan has no floors to work with
    #[error("Plan '{plan}' has no floors")]
    EmptyPlan { plan: String },

    /// No plan, engine or other named entity matched the query
    #[error("{kind} not found: '{query}'")]
    NotFound { kind: String, query: String },

    /// The query matched more than one name
    #[error("Ambiguous {kind} '{query}': did you mean {}?", .suggestions.join(", "))]
    Ambiguous {
        kind: String,
        query: String,
        suggestions: Vec<String>,
    },

    /// A named entity already exists
    #[error("{kind} already exists: '{name}'")]
    AlreadyExists { kind: String, name: String },

    /// An edit was requested but the namespace has no current plan
    #[error("No plan selected for {realm}/{actor}")]
    NoPlanSelected { realm: String, actor: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Store file is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl FortError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        FortError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, query: impl Into<String>) -> Self {
        FortError::NotFound {
            kind: kind.into(),
            query: query.into(),
        }
    }

    /// Create an Ambiguous error, keeping at most [`MAX_SUGGESTIONS`] names
    pub fn ambiguous(kind: impl Into<String>, query: impl Into<String>, mut suggestions: Vec<String>) -> Self {
        suggestions.truncate(MAX_SUGGESTIONS);
        FortError::Ambiguous {
            kind: kind.into(),
            query: query.into(),
            suggestions,
        }
    }

    /// Create an AlreadyExists error
    pub fn already_exists(kind: impl Into<String>, name: impl Into<String>) -> Self {
        FortError::AlreadyExists {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        FortError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        FortError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        FortError::SerializationError {
            reason: reason.into(),
        }
    }

    /// True for caller-input errors (bad parameters or an unusable plan)
    pub fn is_validation(&self) -> bool {
        matches!(self, FortError::InvalidInput { .. } | FortError::EmptyPlan { .. })
    }

    /// Check if this is a recoverable error (e.g., can retry once the lock is released)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FortError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FortError::InvalidInput { .. } => "INVALID_INPUT",
            FortError::EmptyPlan { .. } => "EMPTY_PLAN",
            FortError::NotFound { .. } => "NOT_FOUND",
            FortError::Ambiguous { .. } => "AMBIGUOUS_NAME",
            FortError::AlreadyExists { .. } => "ALREADY_EXISTS",
            FortError::NoPlanSelected { .. } => "NO_PLAN_SELECTED",
            FortError::FileError { .. } => "FILE_ERROR",
            FortError::FileLocked { .. } => "FILE_LOCKED",
            FortError::SerializationError { .. } => "SERIALIZATION_ERROR",
            FortError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for FortError {
    fn from(e: serde_json::Error) -> Self {
        FortError::serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = FortError::invalid_input("floors[0].thickness_ft", "7", "Thickness must be 1, 5, 10 or 15 ft");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: FortError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(FortError::not_found("plan", "keep").error_code(), "NOT_FOUND");
        assert_eq!(FortError::already_exists("plan", "keep").error_code(), "ALREADY_EXISTS");
        assert!(FortError::EmptyPlan { plan: "keep".into() }.is_validation());
        assert!(!FortError::not_found("plan", "keep").is_recoverable());
    }

    #[test]
    fn test_ambiguous_truncates_suggestions() {
        let names: Vec<String> = (0..12).map(|i| format!("tower{}", i)).collect();
        match FortError::ambiguous("plan", "tow", names) {
            FortError::Ambiguous { suggestions, .. } => assert_eq!(suggestions.len(), MAX_SUGGESTIONS),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_ambiguous_message_lists_candidates() {
        let err = FortError::ambiguous("plan", "k", vec!["keep".into(), "kiln".into()]);
        assert_eq!(err.to_string(), "Ambiguous plan 'k': did you mean keep, kiln?");
    }
}
