//! Delete configured variable definitions.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;

use crate::makefile::model::{segment, BlockKind};
use crate::makefile::passes::Pass;

/// Removes every definition (continuations included) of the configured
/// variable names.
#[derive(Debug, Clone)]
pub struct StripVariables {
    pub names: BTreeSet<String>,
}

impl StripVariables {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StripVariables {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl Pass for StripVariables {
    fn name(&self) -> &'static str {
        "strip variables"
    }

    fn run(&self, path: &Path, input: &str) -> Result<String> {
        if self.names.is_empty() {
            return Ok(input.to_string());
        }
        let mut out = String::with_capacity(input.len());
        for block in segment(path, input)? {
            if let BlockKind::Variable(name) = &block.kind {
                if self.names.contains(name) {
                    tracing::debug!("{}: stripped variable `{}`", path.display(), name);
                    continue;
                }
            }
            out.push_str(&block.text());
        }
        Ok(out)
    }
}
