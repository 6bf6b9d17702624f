//! Cross-file survey of variables and targets.
//!
//! Answers "which names are defined in more than one Makefile", the
//! question that decides what the update pipeline will suffix. Read
//! only; nothing on disk changes.

use std::fmt::Write;
use std::path::Path;

use anyhow::{bail, Result};

use crate::ops::update::{collect_makefiles, load_models};

/// Collapse a definition onto one line for display.
fn condense(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn shorten(s: &str, max: usize) -> String {
    let condensed = condense(s);
    if condensed.chars().count() <= max {
        condensed
    } else {
        let head: String = condensed.chars().take(max).collect();
        format!("{head}...")
    }
}

/// Build the report for the tree rooted at `root`.
pub fn report(root: &Path) -> Result<String> {
    let makefiles = collect_makefiles(root)?;
    if makefiles.is_empty() {
        bail!("no Makefiles found under {}", root.display());
    }
    let models = load_models(&makefiles)?;

    let mut out = String::new();
    writeln!(out, "{} Makefile(s) under {}", makefiles.len(), root.display())?;

    let common_vars = models.common_variables();
    writeln!(out, "\nVariables defined in more than one file: {}", common_vars.len())?;
    for (name, defs) in &common_vars {
        writeln!(out, "  {name}")?;
        for (path, var) in defs {
            let rel = path.strip_prefix(root).unwrap_or(path);
            writeln!(out, "    {}: {}", rel.display(), shorten(&var.definition, 60))?;
        }
    }

    let common_targets = models.common_targets();
    writeln!(out, "\nTargets defined in more than one file: {}", common_targets.len())?;
    for (name, defs) in &common_targets {
        let files: Vec<String> = defs
            .iter()
            .map(|(path, _)| {
                let rel = path.strip_prefix(root).unwrap_or(path);
                rel.display().to_string()
            })
            .collect();
        writeln!(out, "  {name}: {}", files.join(", "))?;
    }
    Ok(out)
}
