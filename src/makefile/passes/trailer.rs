//! The generated suffix-rule trailer.
//!
//! Generated rules live behind a fixed marker line at the end of the
//! file. [`StripTrailer`] removes a stale trailer wholesale;
//! [`EmitSuffixRules`] appends a fresh one. Running strip-then-emit is
//! idempotent as a pair.

use std::path::Path;

use anyhow::Result;

use crate::makefile::passes::Pass;

/// First line of the generated trailer. Everything from this line to
/// the end of the file is machine-owned.
pub const TRAILER_MARKER: &str = "# DO NOT DELETE THIS LINE -- generated rules follow.\n";

/// Removes a previously generated trailer (marker line through end of
/// file), together with the blank separator line before it.
#[derive(Debug, Clone)]
pub struct StripTrailer;

impl Pass for StripTrailer {
    fn name(&self) -> &'static str {
        "strip trailer"
    }

    fn run(&self, _path: &Path, input: &str) -> Result<String> {
        let Some(pos) = find_marker(input) else {
            return Ok(input.to_string());
        };
        let mut out = input[..pos].to_string();
        if out.ends_with("\n\n") {
            out.pop();
        }
        Ok(out)
    }
}

/// Appends the generated trailer when absent: the marker, then a `.c.o`
/// suffix rule expanding the given flag variables.
#[derive(Debug, Clone)]
pub struct EmitSuffixRules {
    /// Variable names expanded on the compile line, in order (for
    /// example `CFLAG_crypto`, `INCLUDE_crypto`).
    pub flag_vars: Vec<String>,
}

impl Pass for EmitSuffixRules {
    fn name(&self) -> &'static str {
        "emit suffix rules"
    }

    fn run(&self, _path: &Path, input: &str) -> Result<String> {
        if find_marker(input).is_some() {
            return Ok(input.to_string());
        }
        let mut out = input.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
        out.push_str(TRAILER_MARKER);
        out.push_str("\n.SUFFIXES: .c .o\n\n.c.o:\n\t$(CC)");
        for var in &self.flag_vars {
            out.push_str(" $(");
            out.push_str(var);
            out.push(')');
        }
        out.push_str(" -c -o $@ $<\n");
        Ok(out)
    }
}

/// Byte offset of the marker line, which must sit at a line start.
fn find_marker(input: &str) -> Option<usize> {
    let pos = input.find(TRAILER_MARKER)?;
    (pos == 0 || input[..pos].ends_with('\n')).then_some(pos)
}
