//! Makefile parsing and rewriting.
//!
//! The narrow Makefile dialect handled here is the one the rewrite
//! passes depend on: `NAME=...` variable definitions, `name: prereqs`
//! targets with tab-indented recipes, and backslash continuations.
//! This is deliberately not a general Makefile grammar.

pub mod error;
pub mod model;
pub mod passes;
pub mod paths;
pub mod token;

pub use error::MakefileError;
pub use model::{Makefile, ModelSet, Target, Variable};
pub use token::replace_token;
