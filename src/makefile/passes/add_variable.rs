//! Insert a variable definition when absent.

use std::path::Path;

use anyhow::Result;

use crate::makefile::model::{segment, BlockKind};
use crate::makefile::passes::Pass;

/// Adds `name=definition` after the last existing variable definition
/// (or at the top of the file when there is none). A file that already
/// defines the variable is left untouched.
#[derive(Debug, Clone)]
pub struct AddVariable {
    pub name: String,
    pub definition: String,
}

impl Pass for AddVariable {
    fn name(&self) -> &'static str {
        "add variable"
    }

    fn run(&self, path: &Path, input: &str) -> Result<String> {
        let blocks = segment(path, input)?;
        let mut last_variable = None;
        for (i, block) in blocks.iter().enumerate() {
            match &block.kind {
                BlockKind::Variable(name) if *name == self.name => {
                    return Ok(input.to_string());
                }
                BlockKind::Variable(_) => last_variable = Some(i),
                _ => {}
            }
        }

        let new_line = format!("{}={}\n", self.name, self.definition);
        let insert_at = last_variable.map(|i| i + 1).unwrap_or(0);
        let mut out = String::with_capacity(input.len() + new_line.len());
        for (i, block) in blocks.iter().enumerate() {
            if i == insert_at {
                out.push_str(&new_line);
            }
            out.push_str(&block.text());
        }
        if insert_at == blocks.len() {
            out.push_str(&new_line);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(pass: &AddVariable, input: &str) -> String {
        pass.run(Path::new("m"), input).unwrap()
    }

    fn pass() -> AddVariable {
        AddVariable {
            name: "PERL".to_string(),
            definition: " perl".to_string(),
        }
    }

    #[test]
    fn inserts_after_last_variable() {
        let input = "CC= cc\nCFLAG= -O2\n\nall:\n\techo hi\n";
        let expected = "CC= cc\nCFLAG= -O2\nPERL= perl\n\nall:\n\techo hi\n";
        assert_eq!(run(&pass(), input), expected);
    }

    #[test]
    fn inserts_at_top_when_no_variables() {
        assert_eq!(run(&pass(), "all:\n\techo hi\n"), "PERL= perl\nall:\n\techo hi\n");
    }

    #[test]
    fn existing_definition_untouched() {
        let input = "PERL= /usr/bin/perl\n";
        assert_eq!(run(&pass(), input), input);
    }

    #[test]
    fn idempotent() {
        let once = run(&pass(), "CC= cc\n");
        assert_eq!(run(&pass(), &once), once);
    }
}
