//! Makemend - batch refactoring passes for hand-maintained Makefiles
//!
//! This crate provides the core library functionality for makemend:
//! a line-oriented Makefile model, token-aware text substitution, and
//! an ordered pipeline of idempotent rewrite passes. It also houses the
//! chord practice-track fetcher (`ptcfetch`), which shares the crate's
//! process and download plumbing.

pub mod chords;
pub mod config;
pub mod makefile;
pub mod ops;
pub mod util;

pub use config::Config;
pub use makefile::error::MakefileError;
pub use makefile::model::{Makefile, ModelSet, Target, Variable};
