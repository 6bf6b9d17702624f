//! Rename variables and targets shared across files.
//!
//! Names defined in more than one Makefile get a directory suffix so
//! the files can later be merged into one flat namespace. The actual
//! rewriting is the token-aware substitution; this pass only checks
//! the names exist and maps every line through it.

use std::path::Path;

use anyhow::Result;

use crate::makefile::error::MakefileError;
use crate::makefile::model::Makefile;
use crate::makefile::passes::Pass;
use crate::makefile::token::replace_token;

#[derive(Debug, Clone)]
pub struct RenameCommon {
    /// (old name, new name) pairs, applied in order to every line.
    pub renames: Vec<(String, String)>,
}

impl Pass for RenameCommon {
    fn name(&self) -> &'static str {
        "rename common names"
    }

    fn run(&self, path: &Path, input: &str) -> Result<String> {
        if self.renames.is_empty() {
            return Ok(input.to_string());
        }
        let model = Makefile::parse(path, input)?;
        for (old, _) in &self.renames {
            if !model.variables.contains_key(old) && !model.targets.contains_key(old) {
                return Err(MakefileError::UnknownToken {
                    name: old.clone(),
                    path: path.to_path_buf(),
                }
                .into());
            }
        }

        let mut out = String::with_capacity(input.len());
        for line in input.split_inclusive('\n') {
            let (body, newline) = match line.strip_suffix('\n') {
                Some(body) => (body, "\n"),
                None => (line, ""),
            };
            let mut rewritten = body.to_string();
            for (old, new) in &self.renames {
                rewritten = replace_token(&rewritten, old, new);
            }
            out.push_str(&rewritten);
            out.push_str(newline);
        }
        Ok(out)
    }
}
