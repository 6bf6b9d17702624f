//! Generated `GNUmakefile`/`BSDmakefile` shims.
//!
//! Each directory holding a `Makefile` gets thin wrapper files so both
//! make flavors pick up the shared rules. The wrappers are fixed
//! boilerplate parameterized by the path back to the top of the tree;
//! existing files are never overwritten.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util;

const GNU_MAKEFILE: &str = "GNUmakefile";
const BSD_MAKEFILE: &str = "BSDmakefile";

/// Create the wrapper files next to `makefile_path` if absent.
/// `rel_dir` is the makefile's directory relative to the top of the
/// tree. Returns the paths created.
pub fn generate_aux_files(makefile_path: &Path, rel_dir: &str) -> Result<Vec<PathBuf>> {
    let dir = makefile_path.parent().unwrap_or_else(|| Path::new("."));
    let top = path_to_top(rel_dir);
    let mut created = Vec::new();

    let gnu = format!(
        "# Generated by makemend; do not edit. Changes belong in Makefile.\n\
         TOP= {top}\n\
         \n\
         include Makefile\n"
    );
    let bsd = format!(
        "# Generated by makemend; do not edit. Changes belong in Makefile.\n\
         TOP= {top}\n\
         \n\
         .include \"Makefile\"\n"
    );

    for (name, contents) in [(GNU_MAKEFILE, gnu), (BSD_MAKEFILE, bsd)] {
        let path = dir.join(name);
        if path.exists() {
            continue;
        }
        util::fs::write_string(&path, &contents)?;
        tracing::info!("{}: created", path.display());
        created.push(path);
    }
    Ok(created)
}

/// The relative path from `rel_dir` back to the top of the tree
/// (`crypto/asn1` becomes `../..`).
fn path_to_top(rel_dir: &str) -> String {
    let depth = rel_dir
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .count();
    if depth == 0 {
        ".".to_string()
    } else {
        vec![".."; depth].join("/")
    }
}
