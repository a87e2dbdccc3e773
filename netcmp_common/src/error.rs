//! Error types for declaration and comparison.
//!
//! Declaration errors are raised by the call that caused them and leave the
//! engine state untouched. Structural differences between the graphs are not
//! errors; they are reported as findings.

use thiserror::Error;

use crate::GraphIndex;

/// Errors that can occur while declaring graphs or running a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    // === Declaration phase errors ===
    /// A device template with this name was already declared.
    #[error("device template '{name}' is already defined")]
    DuplicateTemplate {
        /// The template name as declared.
        name: String,
    },

    /// An instance referenced a template that was never declared.
    #[error("device template '{name}' is not defined")]
    UnknownTemplate {
        /// The template name the instance asked for.
        name: String,
    },

    /// The connection list length differs from the template pin count.
    #[error("{found} nets declared for {expected}-pin device '{template}'")]
    ArityMismatch {
        /// Template of the rejected instance.
        template: String,
        /// Pin count of the template.
        expected: usize,
        /// Number of nets supplied.
        found: usize,
    },

    /// The instance name is already used in this graph.
    #[error("instance '{name}' is already defined in graph {graph}")]
    DuplicateInstance {
        /// Graph the instance was declared in.
        graph: GraphIndex,
        /// The reused instance name.
        name: String,
    },

    /// The alias would unify two nets declared as distinct primaries.
    #[error(
        "aliasing '{net}' in graph {graph} would merge distinct nets '{first}' and '{second}'"
    )]
    ConflictingAlias {
        /// Graph of the alias declaration.
        graph: GraphIndex,
        /// Name whose closure triggered the conflict.
        net: String,
        /// Primary of the first closure.
        first: String,
        /// Primary of the second closure.
        second: String,
    },

    /// A template, pin, instance or net name was empty.
    #[error("{what} name must not be empty")]
    EmptyName {
        /// What kind of name was empty.
        what: &'static str,
    },

    /// Graph numbers are limited to 0 and 1.
    #[error("graph number can only be 0 or 1, got {0}")]
    InvalidGraphIndex(usize),

    /// Declarations are closed once a comparison has started.
    #[error("the graphs are frozen; reset the engine before declaring again")]
    Frozen,

    // === Execution phase errors (indicate an algorithm defect) ===
    /// An internal invariant of the refinement was violated.
    #[error("internal error: {message} (vertices: {})", vertices.join(", "))]
    Internal {
        /// What went wrong.
        message: String,
        /// The offending vertices, as `graph:name`.
        vertices: Vec<String>,
    },
}

impl CompareError {
    /// Create an internal invariant violation naming the offending vertices.
    pub fn internal(message: impl Into<String>, vertices: Vec<String>) -> Self {
        Self::Internal {
            message: message.into(),
            vertices,
        }
    }

    /// Returns true for errors raised by a declaration call.
    #[must_use]
    pub const fn is_declaration_error(&self) -> bool {
        !matches!(self, Self::Internal { .. } | Self::Frozen)
    }
}
