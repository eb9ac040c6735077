// Copyright 2025 Cowboy AI, LLC.

//! Error types for trait composition

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while composing traits
///
/// Every variant is terminal: composition never retries internally and no
/// partially composed object is visible on failure. Callers retry by
/// changing the input trait set.
#[derive(Debug, Clone, Error)]
pub enum CompositionError {
    /// A trait references dependencies that are missing or cyclic
    #[error("Dependency error: {message}")]
    DependencyError {
        /// What went wrong with the dependency graph
        message: String,
        /// The trait names involved (missing dependencies, or the cycle)
        details: Vec<String>,
    },

    /// Two traits define the same field with incompatible types
    #[error("Type mismatch on field '{field}': {details}")]
    TypeMismatch {
        /// The field both traits define
        field: String,
        /// The traits whose definitions conflict
        conflicting_traits: Vec<String>,
        /// The incompatible type tags
        details: String,
    },

    /// More than one trait claims the state machine while that is disallowed
    #[error("Multiple state machines: {} both declare one", .conflicting_traits.join(" and "))]
    MultipleStateMachines {
        /// The current owner and the trait that also declared one
        conflicting_traits: Vec<String>,
    },

    /// Strict mode rejected a composition that produced warnings
    #[error("Unresolved collisions in strict mode: {} warning(s)", .warnings.len())]
    UnresolvedCollision {
        /// The warnings that caused the rejection
        warnings: Vec<String>,
    },

    /// A trait or override configuration is malformed
    #[error("Invalid trait: {message}")]
    InvalidTrait {
        /// Why the input was rejected
        message: String,
    },
}

/// Stable machine-readable tags for the external error contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionErrorKind {
    /// Missing or cyclic dependencies
    DependencyError,
    /// Incompatible field types during schema merge
    TypeMismatch,
    /// More than one trait claimed state-machine ownership
    MultipleStateMachines,
    /// Strict-mode rejection of a composition with warnings
    UnresolvedCollision,
    /// Malformed trait or override configuration
    InvalidTrait,
}

impl CompositionErrorKind {
    /// The wire tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionErrorKind::DependencyError => "dependency_error",
            CompositionErrorKind::TypeMismatch => "type_mismatch",
            CompositionErrorKind::MultipleStateMachines => "multiple_state_machines",
            CompositionErrorKind::UnresolvedCollision => "unresolved_collision",
            CompositionErrorKind::InvalidTrait => "invalid_trait",
        }
    }
}

/// Result type for composition operations
pub type CompositionResult<T> = Result<T, CompositionError>;

impl CompositionError {
    /// The machine-readable kind of this error
    pub fn kind(&self) -> CompositionErrorKind {
        match self {
            CompositionError::DependencyError { .. } => CompositionErrorKind::DependencyError,
            CompositionError::TypeMismatch { .. } => CompositionErrorKind::TypeMismatch,
            CompositionError::MultipleStateMachines { .. } => {
                CompositionErrorKind::MultipleStateMachines
            }
            CompositionError::UnresolvedCollision { .. } => {
                CompositionErrorKind::UnresolvedCollision
            }
            CompositionError::InvalidTrait { .. } => CompositionErrorKind::InvalidTrait,
        }
    }

    /// Create an invalid-trait error
    pub fn invalid_trait(msg: impl Into<String>) -> Self {
        CompositionError::InvalidTrait {
            message: msg.into(),
        }
    }

    /// Check if this is a dependency error
    pub fn is_dependency_error(&self) -> bool {
        matches!(self, CompositionError::DependencyError { .. })
    }

    /// Check if this is a type mismatch
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, CompositionError::TypeMismatch { .. })
    }

    /// Check if this error was produced by strict mode
    pub fn is_strict_mode_rejection(&self) -> bool {
        matches!(self, CompositionError::UnresolvedCollision { .. })
    }
}
