//! Line classification and the in-memory Makefile model.
//!
//! Parsing is a single pass over the physical lines with an explicit
//! four-state machine: idle, variable continuation, prerequisite
//! continuation, and recipe accumulation. Every byte of the input ends
//! up in exactly one [`Block`], so an untouched model re-serializes to
//! the original file byte for byte.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::makefile::error::MakefileError;

/// Targets whose names end in this suffix are compiler rules, too
/// numerous and mechanical to model individually. Their lines are still
/// consumed as a block so recipe bodies never leak into passthrough.
pub const OBJECT_SUFFIX: &str = ".o";

/// What a contiguous run of physical lines represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// A variable definition, possibly continuation-joined.
    Variable(String),
    /// A modeled target: declaration, prerequisite continuations, and
    /// recipe lines.
    Target(String),
    /// An object-suffix rule, recognized and skipped as a unit.
    ObjectRule(String),
    /// A passthrough line: comment, blank, or anything unrecognized.
    Text,
}

/// A run of physical lines, stored verbatim (trailing newlines and
/// backslash continuations included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub lines: Vec<String>,
}

impl Block {
    /// The verbatim text of this block.
    pub fn text(&self) -> String {
        self.lines.concat()
    }
}

/// A variable definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    /// Right-hand-side text after the `=`, verbatim, continuations and
    /// embedded newlines preserved.
    pub definition: String,
    /// Physical lines occupied by the definition.
    pub num_lines: usize,
}

/// A target definition, merged across repeated declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    /// Text after the colon. Verbatim for a single declaration;
    /// space-joined in declaration order when the target is declared
    /// more than once.
    pub prerequisites: String,
    /// Concatenation of the tab-indented recipe lines, verbatim.
    pub recipe: String,
    /// Physical lines occupied, summed across declarations.
    pub num_lines: usize,
}

/// The parsed model of one Makefile.
#[derive(Debug, Clone)]
pub struct Makefile {
    pub path: PathBuf,
    pub variables: BTreeMap<String, Variable>,
    pub targets: BTreeMap<String, Target>,
    blocks: Vec<Block>,
}

/// Whether the logical line continues on the next physical line.
pub fn continues(line: &str) -> bool {
    line.strip_suffix('\n').unwrap_or(line).ends_with('\\')
}

/// The variable name defined by `line`, if it matches the variable
/// pattern: optional leading spaces, then a name free of `#`, tab,
/// space, and newline, immediately followed by `=`.
pub fn variable_name(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(' ');
    let eq = rest.find('=')?;
    let name = &rest[..eq];
    let valid = !name.is_empty()
        && !name
            .bytes()
            .any(|b| matches!(b, b'#' | b'\t' | b' ' | b'\n'));
    valid.then_some(name)
}

/// The target name declared by `line`, if it matches the target
/// pattern: a name free of `#`, tab, `=`, and newline, immediately
/// followed by `:`.
pub fn target_name(line: &str) -> Option<&str> {
    let colon = line.find(':')?;
    let name = &line[..colon];
    let valid = !name.is_empty()
        && !name
            .bytes()
            .any(|b| matches!(b, b'#' | b'\t' | b'=' | b'\n'));
    valid.then_some(name)
}

/// Segment `text` into blocks. Fails with `StructuralConflict` when a
/// line matches both the variable and the target pattern; that is
/// malformed input (or a pattern bug) and is never resolved silently.
pub fn segment(path: &Path, text: &str) -> Result<Vec<Block>, MakefileError> {
    let mut blocks = Vec::new();
    let mut lines = text.split_inclusive('\n').peekable();
    let mut line_no = 0usize;

    while let Some(line) = lines.next() {
        line_no += 1;

        match (variable_name(line), target_name(line)) {
            (Some(_), Some(_)) => {
                return Err(MakefileError::StructuralConflict {
                    path: path.to_path_buf(),
                    line: line_no,
                    text: line.to_string(),
                });
            }
            (Some(name), None) => {
                let name = name.to_string();
                let mut collected = vec![line.to_string()];
                while continues(collected.last().unwrap()) {
                    match lines.next() {
                        Some(next) => {
                            line_no += 1;
                            collected.push(next.to_string());
                        }
                        None => break,
                    }
                }
                blocks.push(Block {
                    kind: BlockKind::Variable(name),
                    lines: collected,
                });
            }
            (None, Some(name)) => {
                let kind = if name.ends_with(OBJECT_SUFFIX) {
                    BlockKind::ObjectRule(name.to_string())
                } else {
                    BlockKind::Target(name.to_string())
                };
                let mut collected = vec![line.to_string()];
                // Prerequisite continuations.
                while continues(collected.last().unwrap()) {
                    match lines.next() {
                        Some(next) => {
                            line_no += 1;
                            collected.push(next.to_string());
                        }
                        None => break,
                    }
                }
                // Recipe lines, including their own continuations. The
                // first non-tab line ends the block and is reclassified
                // on the next loop iteration; no line is ever dropped.
                let mut in_continuation = false;
                while let Some(next) = lines.peek() {
                    if !in_continuation && !next.starts_with('\t') {
                        break;
                    }
                    let next = lines.next().unwrap();
                    line_no += 1;
                    in_continuation = continues(next);
                    collected.push(next.to_string());
                }
                blocks.push(Block {
                    kind,
                    lines: collected,
                });
            }
            (None, None) => {
                blocks.push(Block {
                    kind: BlockKind::Text,
                    lines: vec![line.to_string()],
                });
            }
        }
    }

    Ok(blocks)
}

impl Makefile {
    /// Parse one Makefile's text into a model.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self, MakefileError> {
        let path = path.into();
        let blocks = segment(&path, text)?;
        let mut variables = BTreeMap::new();
        let mut targets: BTreeMap<String, Target> = BTreeMap::new();

        for block in &blocks {
            match &block.kind {
                BlockKind::Variable(name) => {
                    let first = &block.lines[0];
                    let trimmed = first.trim_start_matches(' ');
                    let eq = (first.len() - trimmed.len()) + trimmed.find('=').unwrap();
                    let mut definition = first[eq + 1..].to_string();
                    for line in &block.lines[1..] {
                        definition.push_str(line);
                    }
                    let var = Variable {
                        name: name.clone(),
                        definition,
                        num_lines: block.lines.len(),
                    };
                    if variables.insert(name.clone(), var).is_some() {
                        return Err(MakefileError::DuplicateDefinition {
                            name: name.clone(),
                            path: path.clone(),
                        });
                    }
                }
                BlockKind::Target(name) => {
                    let (prerequisites, recipe) = split_target_block(&block.lines);
                    match targets.get_mut(name) {
                        Some(existing) => {
                            if !recipe.is_empty() && !existing.recipe.is_empty() {
                                return Err(MakefileError::ConflictingRecipe {
                                    name: name.clone(),
                                    path: path.clone(),
                                });
                            }
                            existing.prerequisites =
                                join_prerequisites(&existing.prerequisites, &prerequisites);
                            if existing.recipe.is_empty() {
                                existing.recipe = recipe;
                            }
                            existing.num_lines += block.lines.len();
                        }
                        None => {
                            targets.insert(
                                name.clone(),
                                Target {
                                    name: name.clone(),
                                    prerequisites,
                                    recipe,
                                    num_lines: block.lines.len(),
                                },
                            );
                        }
                    }
                }
                BlockKind::ObjectRule(_) | BlockKind::Text => {}
            }
        }

        Ok(Makefile {
            path,
            variables,
            targets,
            blocks,
        })
    }

    /// The verbatim blocks this file was segmented into.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Re-serialize the model. An untouched model reproduces the
    /// original input byte for byte.
    pub fn to_text(&self) -> String {
        self.blocks.iter().map(Block::text).collect()
    }
}

/// Split a target block's lines into (prerequisite text, recipe text).
fn split_target_block(lines: &[String]) -> (String, String) {
    let first = &lines[0];
    let colon = first.find(':').unwrap();
    let mut prerequisites = first[colon + 1..].to_string();
    let mut i = 1;
    while i < lines.len() && continues(&lines[i - 1]) {
        prerequisites.push_str(&lines[i]);
        i += 1;
    }
    let recipe = lines[i..].concat();
    (prerequisites, recipe)
}

/// Space-join prerequisite lists in declaration order.
fn join_prerequisites(existing: &str, added: &str) -> String {
    let pieces: Vec<&str> = [existing, added]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    pieces.join(" ")
}

/// Per-file models merged for cross-file queries.
#[derive(Debug, Default)]
pub struct ModelSet {
    pub files: BTreeMap<PathBuf, Makefile>,
}

impl ModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, makefile: Makefile) {
        self.files.insert(makefile.path.clone(), makefile);
    }

    /// All variable definitions keyed by name, in path order.
    pub fn variables_by_name(&self) -> BTreeMap<&str, Vec<(&Path, &Variable)>> {
        let mut map: BTreeMap<&str, Vec<(&Path, &Variable)>> = BTreeMap::new();
        for makefile in self.files.values() {
            for var in makefile.variables.values() {
                map.entry(&var.name)
                    .or_default()
                    .push((makefile.path.as_path(), var));
            }
        }
        map
    }

    /// All target definitions keyed by name, in path order.
    pub fn targets_by_name(&self) -> BTreeMap<&str, Vec<(&Path, &Target)>> {
        let mut map: BTreeMap<&str, Vec<(&Path, &Target)>> = BTreeMap::new();
        for makefile in self.files.values() {
            for target in makefile.targets.values() {
                map.entry(&target.name)
                    .or_default()
                    .push((makefile.path.as_path(), target));
            }
        }
        map
    }

    /// Variable names defined in more than one file.
    pub fn common_variables(&self) -> BTreeMap<&str, Vec<(&Path, &Variable)>> {
        self.variables_by_name()
            .into_iter()
            .filter(|(_, defs)| defs.len() > 1)
            .collect()
    }

    /// Target names defined in more than one file.
    pub fn common_targets(&self) -> BTreeMap<&str, Vec<(&Path, &Target)>> {
        self.targets_by_name()
            .into_iter()
            .filter(|(_, defs)| defs.len() > 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Makefile {
        Makefile::parse("test/Makefile", text).unwrap()
    }

    #[test]
    fn untouched_model_reserializes_exactly() {
        let text = "FOO= bar baz\n";
        let mf = parse(text);
        assert_eq!(mf.to_text(), text);
        assert_eq!(mf.variables["FOO"].definition, " bar baz\n");
    }

    #[test]
    fn continuation_preserved_verbatim() {
        let text = "OBJS= a.o b.o \\\n\tc.o d.o\n\nall: $(OBJS)\n";
        let mf = parse(text);
        assert_eq!(mf.to_text(), text);
        let var = &mf.variables["OBJS"];
        assert_eq!(var.definition, " a.o b.o \\\n\tc.o d.o\n");
        assert_eq!(var.num_lines, 2);
    }

    #[test]
    fn duplicate_variable_is_fatal() {
        let err = Makefile::parse("m", "FOO=1\nFOO=2\n").unwrap_err();
        assert!(matches!(
            err,
            MakefileError::DuplicateDefinition { ref name, .. } if name == "FOO"
        ));
    }

    #[test]
    fn structural_conflict_is_fatal() {
        // `:=` assignments match both patterns in this dialect.
        let err = Makefile::parse("m", "PATH:=value\n").unwrap_err();
        assert!(matches!(err, MakefileError::StructuralConflict { line: 1, .. }));
    }

    #[test]
    fn target_with_recipe() {
        let text = "clean:\n\trm -f *.o\n\trm -f core\n";
        let mf = parse(text);
        let t = &mf.targets["clean"];
        assert_eq!(t.prerequisites, "\n");
        assert_eq!(t.recipe, "\trm -f *.o\n\trm -f core\n");
        assert_eq!(t.num_lines, 3);
        assert_eq!(mf.to_text(), text);
    }

    #[test]
    fn prerequisite_continuation() {
        let text = "all: foo bar \\\n\tbaz\n\techo done\n";
        let mf = parse(text);
        let t = &mf.targets["all"];
        assert_eq!(t.prerequisites, " foo bar \\\n\tbaz\n");
        assert_eq!(t.recipe, "\techo done\n");
    }

    #[test]
    fn repeated_target_declarations_merge_prerequisites() {
        let text = "install: install_sw\n\techo installing\n\ninstall: install_docs\n";
        let mf = parse(text);
        let t = &mf.targets["install"];
        assert_eq!(t.prerequisites, "install_sw install_docs");
        assert_eq!(t.recipe, "\techo installing\n");
        assert_eq!(t.num_lines, 3);
    }

    #[test]
    fn second_recipe_is_fatal() {
        let text = "all:\n\techo one\nall:\n\techo two\n";
        let err = Makefile::parse("m", text).unwrap_err();
        assert!(matches!(
            err,
            MakefileError::ConflictingRecipe { ref name, .. } if name == "all"
        ));
    }

    #[test]
    fn object_rules_are_skipped_with_their_recipes() {
        let text = "sha1.o: sha1.c\n\t$(CC) -c sha1.c\nCFLAG= -O2\n";
        let mf = parse(text);
        assert!(mf.targets.is_empty());
        assert!(mf.variables.contains_key("CFLAG"));
        // The compiler rule's recipe must not leak into passthrough.
        assert!(!mf
            .blocks()
            .iter()
            .any(|b| b.kind == BlockKind::Text && b.text().starts_with('\t')));
        assert_eq!(mf.to_text(), text);
    }

    #[test]
    fn suffix_rules_are_object_rules() {
        let mf = parse(".c.o:\n\t$(CC) -c $<\n");
        assert!(mf.targets.is_empty());
    }

    #[test]
    fn line_after_recipe_is_reclassified() {
        let text = "all:\n\techo hi\nFOO= bar\n";
        let mf = parse(text);
        assert!(mf.targets.contains_key("all"));
        assert!(mf.variables.contains_key("FOO"));
        assert_eq!(mf.to_text(), text);
    }

    #[test]
    fn comments_and_blanks_pass_through() {
        let text = "# top comment\n\nFOO=1\n";
        let mf = parse(text);
        assert_eq!(mf.blocks()[0].kind, BlockKind::Text);
        assert_eq!(mf.blocks()[1].kind, BlockKind::Text);
        assert_eq!(mf.to_text(), text);
    }

    #[test]
    fn model_set_reports_common_names() {
        let mut set = ModelSet::new();
        set.insert(Makefile::parse("a/Makefile", "CFLAG= -O2\nall:\n\techo a\n").unwrap());
        set.insert(Makefile::parse("b/Makefile", "CFLAG= -g\nall:\n\techo b\nLOCAL=1\n").unwrap());
        let vars = set.common_variables();
        assert_eq!(vars.keys().copied().collect::<Vec<_>>(), vec!["CFLAG"]);
        assert_eq!(vars["CFLAG"].len(), 2);
        assert!(set.common_targets().contains_key("all"));
        assert!(!set.common_variables().contains_key("LOCAL"));
    }
}
