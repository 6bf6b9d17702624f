//! Normalize relative directory paths in path-bearing variables.
//!
//! Rewrites `-I..`-style words so every path is relative to the top of
//! the tree. Only variables listed in the configuration table are
//! touched; everything else in a Makefile that merely looks like a
//! path is left alone. Target definitions are not rewritten; that
//! support is experimental, and the pass warns instead.

use std::path::Path;

use anyhow::Result;

use crate::config::PathVariableSpec;
use crate::makefile::model::{segment, Block, BlockKind};
use crate::makefile::passes::Pass;
use crate::makefile::paths::{normalize_relative_dir, RelativeBase};
use crate::makefile::token::split_preserving_whitespace;

#[derive(Debug, Clone)]
pub struct DirPaths {
    /// The makefile's directory relative to the top (for example
    /// `crypto`).
    pub dir: String,
    pub table: Vec<PathVariableSpec>,
}

impl DirPaths {
    fn spec_for<'a>(&'a self, name: &str) -> Option<&'a PathVariableSpec> {
        self.table
            .iter()
            .find(|spec| name == spec.name || name.starts_with(&format!("{}_", spec.name)))
    }

    fn rewrite_block(&self, block: &Block, spec: &PathVariableSpec) -> String {
        let base = RelativeBase::new(&self.dir, spec.extra_depth);
        let text = block.text();
        // While a $(TOP) reference is still present the definition has
        // not been normalized yet, and a bare `.` still means "this
        // directory" rather than the top.
        let top_marker = text.contains("$(TOP") || text.contains("${TOP");

        let mut out = String::with_capacity(text.len());
        for (i, line) in block.lines.iter().enumerate() {
            let (head, tail) = if i == 0 {
                // Skip past `NAME=` on the defining line.
                let eq = line.find('=').map(|p| p + 1).unwrap_or(0);
                line.split_at(eq)
            } else {
                ("", line.as_str())
            };
            out.push_str(head);
            for word in split_preserving_whitespace(tail) {
                if word.chars().next().is_some_and(char::is_whitespace) || word == "\\" {
                    out.push_str(word);
                    continue;
                }
                match self.rewrite_word(word, spec, &base, top_marker) {
                    Some(new) => out.push_str(&new),
                    None => out.push_str(word),
                }
            }
        }
        out
    }

    fn rewrite_word(
        &self,
        word: &str,
        spec: &PathVariableSpec,
        base: &RelativeBase,
        top_marker: bool,
    ) -> Option<String> {
        if spec.flags.is_empty() {
            return normalize_relative_dir(word, "", base, top_marker);
        }
        let flag = spec.flags.iter().find(|f| word.starts_with(f.as_str()))?;
        normalize_relative_dir(word, flag, base, top_marker)
    }
}

impl Pass for DirPaths {
    fn name(&self) -> &'static str {
        "normalize directory paths"
    }

    fn run(&self, path: &Path, input: &str) -> Result<String> {
        if self.table.is_empty() {
            return Ok(input.to_string());
        }
        let mut out = String::with_capacity(input.len());
        for block in segment(path, input)? {
            match &block.kind {
                BlockKind::Variable(name) => {
                    if let Some(spec) = self.spec_for(name) {
                        out.push_str(&self.rewrite_block(&block, spec));
                    } else {
                        out.push_str(&block.text());
                    }
                }
                BlockKind::Target(_) | BlockKind::ObjectRule(_) => {
                    let text = block.text();
                    if text.contains("$(TOP") || text.contains("${TOP") {
                        // TODO: rewrite directory paths in target
                        // definitions once the prerequisite grammar
                        // settles.
                        tracing::warn!(
                            "{}: directory paths in target definitions are not rewritten",
                            path.display()
                        );
                    }
                    out.push_str(&text);
                }
                BlockKind::Text => out.push_str(&block.text()),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn pass(dir: &str) -> DirPaths {
        DirPaths {
            dir: dir.to_string(),
            table: Config::default().path_variables,
        }
    }

    fn run(dir: &str, input: &str) -> String {
        pass(dir).run(Path::new("crypto/Makefile"), input).unwrap()
    }

    #[test]
    fn replaces_include_paths() {
        let orig = "INCLUDE_crypto=\t-I. -I$(TOP_crypto) -I../include $(ZLIB_INCLUDE)\n\
                    INCLUDES_crypto=\t-I.. -I../.. -I../modes -I../asn1 -I../evp -I../../include $(ZLIB_INCLUDE)\n";
        let expected = "INCLUDE_crypto=\t-Icrypto -I. -Iinclude $(ZLIB_INCLUDE)\n\
                        INCLUDES_crypto=\t-Icrypto -I. -Icrypto/modes -Icrypto/asn1 -Icrypto/evp -Iinclude $(ZLIB_INCLUDE)\n";
        assert_eq!(run("crypto", orig), expected);
        // Idempotent.
        assert_eq!(run("crypto", expected), expected);
    }

    #[test]
    fn does_not_eat_unaffected_lines() {
        let orig = "INCLUDE_crypto=\t-I. -I$(TOP_crypto) -I../include $(ZLIB_INCLUDE)\n\
                    # INCLUDES_crypto targets sudbirs!\n\
                    INCLUDES_crypto=\t-I.. -I../.. -I../modes -I../asn1 -I../evp -I../../include $(ZLIB_INCLUDE)\n\
                    RM_crypto=             rm -f\n";
        let expected = "INCLUDE_crypto=\t-Icrypto -I. -Iinclude $(ZLIB_INCLUDE)\n\
                        # INCLUDES_crypto targets sudbirs!\n\
                        INCLUDES_crypto=\t-Icrypto -I. -Icrypto/modes -Icrypto/asn1 -Icrypto/evp -Iinclude $(ZLIB_INCLUDE)\n\
                        RM_crypto=             rm -f\n";
        assert_eq!(run("crypto", orig), expected);
        assert_eq!(run("crypto", expected), expected);
    }

    #[test]
    fn bare_path_lists_are_joined_and_stable() {
        let orig = "FIPS_OBJ_LISTS=sha/lib hmac/lib rand/lib des/lib aes/lib dsa/lib rsa/lib \\\n            dh/lib utl/lib ecdsa/lib ecdh/lib cmac/lib\n";
        let expected = "FIPS_OBJ_LISTS=fips/sha/lib fips/hmac/lib fips/rand/lib fips/des/lib fips/aes/lib fips/dsa/lib fips/rsa/lib \\\n            fips/dh/lib fips/utl/lib fips/ecdsa/lib fips/ecdh/lib fips/cmac/lib\n";
        assert_eq!(run("fips", orig), expected);
        assert_eq!(run("fips", expected), expected);
    }

    #[test]
    fn unlisted_variables_untouched() {
        let input = "SRCS= ../common/foo.c\n";
        assert_eq!(run("crypto", input), input);
    }
}
