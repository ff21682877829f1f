//! IR Error Types

use thiserror::Error;

/// Errors raised while building, cloning or rewriting a RAM program.
///
/// None of these are user-facing: they signal a bug in the pass that
/// produced the offending tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    /// A relation with this name is already declared
    #[error("relation '{0}' is already declared in this program")]
    DuplicateRelation(String),

    /// A subroutine with this name is already registered
    #[error("subroutine '{0}' is already registered in this program")]
    DuplicateSubroutine(String),

    /// A relation reference whose target is not owned by the enclosing program
    #[error("dangling RAM relation reference to '{relation}' at {location}")]
    DanglingReference { relation: String, location: String },

    /// The main statement was required but never set
    #[error("program has no main statement")]
    MissingMain,

    /// A subroutine was required but never registered
    #[error("unknown subroutine '{0}'")]
    UnknownSubroutine(String),
}

/// Result type for IR operations
pub type IrResult<T> = Result<T, IrError>;
