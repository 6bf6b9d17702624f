//! High-level operations.
//!
//! This module contains the implementation of makemend commands.

pub mod dump;
pub mod fetch_tracks;
pub mod report;
pub mod update;

pub use dump::dump;
pub use fetch_tracks::fetch_tracks;
pub use report::report;
pub use update::{update, UpdateSummary};
