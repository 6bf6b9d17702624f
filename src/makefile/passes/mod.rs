//! The rewrite pass pipeline.
//!
//! Each pass is a pure text-to-text transformation over one Makefile.
//! The driver composes them with [`run_all`] and writes the result
//! back through a temporary file and an atomic rename, at most once
//! per file. Every pass is idempotent: running it again on its own
//! output is a no-op.
//!
//! The driver composes passes in a fixed order, because later passes
//! rely on structural guarantees established by earlier ones:
//!
//! 1. [`StripTrailer`]: stale generated trailers go first, so no
//!    later pass sees generated rules.
//! 2. [`StripVariables`]: before renaming, so stripped names are
//!    never suffixed.
//! 3. [`AddVariable`]: inserted definitions participate in later
//!    passes.
//! 4. [`MoveRecipe`]: relocation deletes its source target, so it
//!    must precede renaming, which consults the target map.
//! 5. [`RenameCommon`]: cross-file disambiguation.
//! 6. [`DirPaths`]: path words are rewritten after names settle.
//! 7. [`EmitSuffixRules`]: the regenerated trailer goes last.

mod add_variable;
mod aux_files;
mod dir_paths;
mod move_recipe;
mod rename_common;
mod strip_variables;
mod trailer;

pub use add_variable::AddVariable;
pub use aux_files::generate_aux_files;
pub use dir_paths::DirPaths;
pub use move_recipe::MoveRecipe;
pub use rename_common::RenameCommon;
pub use strip_variables::StripVariables;
pub use trailer::{EmitSuffixRules, StripTrailer, TRAILER_MARKER};

use std::path::Path;

use anyhow::Result;

/// One idempotent text-rewrite transformation.
pub trait Pass {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Transform the file's entire text. Returning the input unchanged
    /// means "nothing to do".
    fn run(&self, path: &Path, input: &str) -> Result<String>;
}

/// Run a sequence of passes over one file's text.
///
/// Pure: nothing is written here. The driver compares the result to
/// the text on disk and rewrites the file at most once, via
/// [`crate::util::fs::replace_file`], so a failing pass leaves the
/// file untouched and an idempotent run leaves it byte-identical.
pub fn run_all(path: &Path, input: &str, passes: &[Box<dyn Pass>]) -> Result<String> {
    let mut text = input.to_string();
    for pass in passes {
        let out = pass.run(path, &text)?;
        if out != text {
            tracing::debug!("{}: {}", path.display(), pass.name());
            text = out;
        }
    }
    Ok(text)
}
