//! Configuration for the rewrite pipeline.
//!
//! The pipeline is configured by an optional TOML file sitting next to
//! the tree being rewritten. The loaded value is passed explicitly into
//! the passes that need it; nothing here is process-global state.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Rewrite pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Variables whose definitions are deleted wholesale.
    pub strip_variables: Vec<String>,

    /// Variables inserted when absent.
    pub add_variables: Vec<VariableSpec>,

    /// Recipe relocations (source target merged into destination).
    pub move_recipes: Vec<MoveSpec>,

    /// Path-bearing variables eligible for directory normalization.
    pub path_variables: Vec<PathVariableSpec>,

    /// Append the generated suffix-rule trailer to each Makefile.
    pub emit_suffix_rules: bool,

    /// Generate `GNUmakefile`/`BSDmakefile` shims where absent.
    pub aux_files: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strip_variables: Vec::new(),
            add_variables: Vec::new(),
            move_recipes: vec![MoveSpec {
                from: "dclean".to_string(),
                to: "clean".to_string(),
            }],
            path_variables: vec![
                PathVariableSpec {
                    name: "INCLUDE".to_string(),
                    extra_depth: 0,
                    flags: vec!["-I".to_string()],
                },
                PathVariableSpec {
                    // Plural include lists are consumed by subdirectory
                    // builds, one level below the defining Makefile.
                    name: "INCLUDES".to_string(),
                    extra_depth: 1,
                    flags: vec!["-I".to_string(), "-L".to_string()],
                },
                PathVariableSpec {
                    name: "FIPS_OBJ_LISTS".to_string(),
                    extra_depth: 0,
                    flags: Vec::new(),
                },
            ],
            emit_suffix_rules: false,
            aux_files: true,
        }
    }
}

/// A variable to insert when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    /// Right-hand-side text, emitted verbatim after the `=`.
    pub definition: String,
}

/// A recipe relocation: `from`'s actions move into `to`, then `from`
/// is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveSpec {
    pub from: String,
    pub to: String,
}

/// A path-bearing variable the directory normalization pass rewrites.
///
/// An empty `flags` list marks a bare path list (every word is a
/// path); otherwise only words carrying one of the flags are touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathVariableSpec {
    pub name: String,
    #[serde(default)]
    pub extra_depth: usize,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file does
    /// not exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}
