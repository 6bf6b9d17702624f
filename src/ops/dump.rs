//! Dump one parsed Makefile model.
//!
//! Debugging aid: shows what the parser extracted from a single file,
//! so classifier surprises are visible without stepping through the
//! pipeline.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;

use crate::makefile::model::Makefile;
use crate::util;

/// Parse `path` and render its model.
pub fn dump(path: &Path) -> Result<String> {
    let text = util::fs::read_to_string(path)?;
    let model = Makefile::parse(path, &text)?;

    let mut out = String::new();
    writeln!(out, "{}", path.display())?;

    writeln!(out, "\nVariables: {}", model.variables.len())?;
    for var in model.variables.values() {
        let definition = var.definition.split_whitespace().collect::<Vec<_>>().join(" ");
        writeln!(out, "  {} = {} ({} line(s))", var.name, definition, var.num_lines)?;
    }

    writeln!(out, "\nTargets: {}", model.targets.len())?;
    for target in model.targets.values() {
        let recipe_lines = target.recipe.lines().count();
        let prerequisites = target.prerequisites.trim();
        if prerequisites.is_empty() {
            writeln!(out, "  {}: ({} recipe line(s))", target.name, recipe_lines)?;
        } else {
            writeln!(
                out,
                "  {}: {} ({} recipe line(s))",
                target.name, prerequisites, recipe_lines
            )?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn dumps_variables_and_targets() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Makefile");
        std::fs::write(
            &path,
            "CFLAG= -O2 \\\n\t-Wall\n\nall: links\n\techo done\n\nfoo.o: foo.c\n\t$(CC) -c foo.c\n",
        )
        .unwrap();

        let out = dump(&path).unwrap();
        assert!(out.contains("Variables: 1"));
        assert!(out.contains("CFLAG = -O2 \\ -Wall (2 line(s))"));
        assert!(out.contains("all: links (1 recipe line(s))"));
        // Object rules are skipped by the model.
        assert!(!out.contains("foo.o"));
    }
}
