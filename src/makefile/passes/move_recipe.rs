//! Relocate one target's actions into another.
//!
//! The historical use is folding `dclean` into `clean`: the
//! destination keeps its prerequisites plus the source's, its recipe
//! gains the source's actions, and the recursive-make dispatch line is
//! kept last so subdirectories are cleaned after the local work. The
//! source target is then deleted together with at most one following
//! blank line.

use std::path::Path;

use anyhow::{ensure, Result};

use crate::makefile::model::{BlockKind, Makefile};
use crate::makefile::passes::Pass;

#[derive(Debug, Clone)]
pub struct MoveRecipe {
    pub from: String,
    pub to: String,
}

impl MoveRecipe {
    fn recursive_line(target: &str) -> String {
        format!("\t@target={}; $(RECURSIVE_MAKE)\n", target)
    }

    /// The merged replacement block for the destination target.
    fn merged_block(&self, model: &Makefile) -> String {
        let to = &model.targets[&self.to];
        let from = &model.targets[&self.from];

        let prerequisites: Vec<&str> = [to.prerequisites.trim(), from.prerequisites.trim()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
        let prerequisites = prerequisites.join(" ");

        let recursive_to = Self::recursive_line(&self.to);
        let recursive_from = Self::recursive_line(&self.from);

        let has_recursive = to.recipe.contains(&recursive_to);
        let to_recipe = to.recipe.replace(&recursive_to, "");
        let from_recipe = from.recipe.replace(&recursive_from, "");

        let mut recipe: Vec<String> = vec![
            to_recipe.trim_end().to_string(),
            from_recipe.trim_end().to_string(),
        ];
        if has_recursive {
            recipe.push(recursive_to.trim_end().to_string());
        }
        let recipe: Vec<String> = recipe.into_iter().filter(|r| !r.is_empty()).collect();

        let mut block = self.to.clone();
        block.push(':');
        if !prerequisites.is_empty() {
            block.push(' ');
            block.push_str(&prerequisites);
        }
        block.push('\n');
        if !recipe.is_empty() {
            block.push_str(&recipe.join("\n"));
            block.push('\n');
        }
        block
    }
}

impl Pass for MoveRecipe {
    fn name(&self) -> &'static str {
        "move recipe"
    }

    fn run(&self, path: &Path, input: &str) -> Result<String> {
        let model = Makefile::parse(path, input)?;
        if !model.targets.contains_key(&self.to) || !model.targets.contains_key(&self.from) {
            // Nothing to move (or already moved); leave the file alone.
            return Ok(input.to_string());
        }

        let merged = self.merged_block(&model);
        let mut out = String::with_capacity(input.len());
        let mut replaced = false;
        let mut deleted = false;
        let mut skip_blank = false;

        for block in model.blocks() {
            if skip_blank {
                skip_blank = false;
                if block.kind == BlockKind::Text && block.text() == "\n" {
                    continue;
                }
            }
            match &block.kind {
                BlockKind::Target(name) if *name == self.to => {
                    // Later declarations of the destination are already
                    // folded into the merged block.
                    if !replaced {
                        out.push_str(&merged);
                        replaced = true;
                    }
                }
                BlockKind::Target(name) if *name == self.from => {
                    deleted = true;
                    skip_blank = true;
                }
                _ => out.push_str(&block.text()),
            }
        }

        ensure!(
            replaced && deleted,
            "{}: inconsistent `{}` -> `{}` relocation",
            path.display(),
            self.from,
            self.to
        );
        tracing::debug!(
            "{}: moved {} actions to {} target",
            path.display(),
            self.from,
            self.to
        );
        Ok(out)
    }
}
