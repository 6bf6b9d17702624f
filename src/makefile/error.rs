//! Makefile model and rewrite error types.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while building or rewriting a Makefile model.
///
/// Every variant is unrecoverable at the point of detection: the caller
/// aborts the whole run without promoting any half-written file. Silent
/// recovery would risk corrupting a build file the operator cannot
/// easily diff against.
#[derive(Debug, Error)]
pub enum MakefileError {
    /// A line matched both the variable and the target pattern. This
    /// indicates malformed input (or a pattern bug) and is never
    /// resolved silently.
    #[error("{path}:{line}: matches both a variable and a target definition: {text:?}")]
    StructuralConflict {
        path: PathBuf,
        line: usize,
        text: String,
    },

    #[error("duplicate definition of variable `{name}` in {path}")]
    DuplicateDefinition { name: String, path: PathBuf },

    #[error("target `{name}` declared with more than one recipe in {path}")]
    ConflictingRecipe { name: String, path: PathBuf },

    /// A rename pass was asked to rewrite a name the model does not
    /// define.
    #[error("cannot rename `{name}`: not defined in {path}")]
    UnknownToken { name: String, path: PathBuf },
}
