//! Relative directory-path normalization for path-bearing variables.
//!
//! The historical Makefiles address sibling directories relative to the
//! directory being built (`-I..`, `-I$(TOP)/include`, `sha/lib`). The
//! normalization pass rewrites those words to be relative to the
//! top-level directory instead, so every file agrees on what `.` means.

/// The directory a path word is resolved against.
///
/// `extra_depth` accounts for variables whose flags are consumed by a
/// subdirectory build (the plural `INCLUDES`-style variables): each
/// level is an unnamed phantom component that only a `..` can cancel.
#[derive(Debug, Clone)]
pub struct RelativeBase {
    components: Vec<String>,
    extra_depth: usize,
}

impl RelativeBase {
    /// Base for a makefile at `dir` (path relative to the top, `.` or
    /// empty meaning the top itself), resolved `extra_depth` levels
    /// below it.
    pub fn new(dir: &str, extra_depth: usize) -> Self {
        let components = dir
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .map(str::to_string)
            .collect();
        RelativeBase {
            components,
            extra_depth,
        }
    }

    /// First named component, used to recognize already-normalized
    /// bare words.
    pub fn first_component(&self) -> Option<&str> {
        self.components.first().map(String::as_str)
    }

    /// Resolve `path` (a `.`-, `..`-, or plain-relative path) against
    /// this base. Returns `None` when the result still depends on a
    /// phantom component or escapes above the top directory.
    pub fn resolve(&self, path: &str) -> Option<String> {
        #[derive(Clone)]
        enum Part {
            Named(String),
            Phantom,
        }
        let mut stack: Vec<Part> = self
            .components
            .iter()
            .map(|c| Part::Named(c.clone()))
            .collect();
        stack.extend((0..self.extra_depth).map(|_| Part::Phantom));

        for part in path.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    stack.pop()?;
                }
                other => stack.push(Part::Named(other.to_string())),
            }
        }

        let mut names = Vec::with_capacity(stack.len());
        for part in stack {
            match part {
                Part::Named(name) => names.push(name),
                Part::Phantom => return None,
            }
        }
        if names.is_empty() {
            Some(".".to_string())
        } else {
            Some(names.join("/"))
        }
    }

    /// Join a bare relative word under this base, unless its first
    /// component shows it is already top-relative.
    pub fn join_bare(&self, word: &str) -> Option<String> {
        if self.extra_depth > 0 {
            return None;
        }
        let first = word.split('/').next().unwrap_or(word);
        if Some(first) == self.first_component() {
            return None;
        }
        let mut joined = self.components.join("/");
        if joined.is_empty() {
            return None;
        }
        joined.push('/');
        joined.push_str(word);
        Some(joined)
    }
}

/// Normalize one path word from a variable definition.
///
/// `flag_prefix` is the compiler flag glued to the path (`-I`, `-L`, or
/// empty for bare path lists). `top_marker` reports whether the
/// enclosing definition still carries a `$(TOP` reference; a bare `.`
/// is only rewritten while that marker is present, because once
/// normalized `.` means the top directory.
///
/// Returns `None` when the word is left alone.
pub fn normalize_relative_dir(
    word: &str,
    flag_prefix: &str,
    base: &RelativeBase,
    top_marker: bool,
) -> Option<String> {
    let path = word.strip_prefix(flag_prefix)?;
    if path.is_empty() {
        return None;
    }

    // $(TOP) / ${TOP_<dir>} references, with an optional trailing path.
    if let Some(rest) = strip_top_reference(path) {
        let rest = rest.trim_start_matches('/');
        let resolved = if rest.is_empty() {
            ".".to_string()
        } else {
            rest.to_string()
        };
        return Some(format!("{flag_prefix}{resolved}"));
    }

    if path.starts_with('$') || path.starts_with('-') || path.starts_with('/') {
        return None;
    }

    if path == "." {
        if !top_marker {
            return None;
        }
        return base.resolve(".").map(|r| format!("{flag_prefix}{r}"));
    }

    if path == ".." || path.starts_with("./") || path.starts_with("../") {
        return base.resolve(path).map(|r| format!("{flag_prefix}{r}"));
    }

    if flag_prefix.is_empty() {
        return base.join_bare(path);
    }

    None
}

/// Strip a leading `$(TOP...)` or `${TOP...}` reference, returning the
/// text after the closing delimiter.
fn strip_top_reference(path: &str) -> Option<&str> {
    let close = if path.starts_with("$(TOP") {
        ')'
    } else if path.starts_with("${TOP") {
        '}'
    } else {
        return None;
    };
    let end = path.find(close)?;
    Some(&path[end + 1..])
}
