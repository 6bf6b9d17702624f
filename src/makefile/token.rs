//! Token-aware text substitution.
//!
//! Makefile tokens share a flat namespace with no sigil required for
//! bare names (targets, assignment left-hand sides), so naive substring
//! replacement would corrupt unrelated identifiers sharing a prefix or
//! suffix. `replace_token` only rewrites whole tokens, and on recipe
//! lines only inside an open Make variable reference, since everything
//! else on a recipe line belongs to the shell.

/// Characters that may legally precede a token.
const LEFT_BOUNDARY: &[char] = &['(', '{', ' '];

/// Characters that may legally follow a token.
const RIGHT_BOUNDARY: &[char] = &[' ', ':', '=', '}', ')'];

/// Replace every whole-token occurrence of `old` in `line` with `new`.
///
/// A token occurrence qualifies when:
/// - it starts the line or follows `(`, `{`, or a space;
/// - it ends the line or is followed by a space, `:`, `=`, `}`, or `)`;
/// - it is not part of a shell-escaped reference (`$${...}`);
/// - on a tab-led recipe line, a `$(` or `${` is still open at that
///   point in the line.
///
/// Replacement is non-overlapping and proceeds left to right; the
/// original string is returned unchanged when no occurrence qualifies.
pub fn replace_token(line: &str, old: &str, new: &str) -> String {
    if old.is_empty() {
        return line.to_string();
    }
    let is_recipe = line.starts_with('\t');
    let mut out = String::with_capacity(line.len());
    // Bytes before `copied` are already in `out`; `search` is where the
    // next occurrence scan begins.
    let mut copied = 0;
    let mut search = 0;

    while let Some(offset) = line[search..].find(old) {
        let start = search + offset;
        let end = start + old.len();

        let left_ok = start == 0
            || line[..start]
                .chars()
                .next_back()
                .is_some_and(|c| LEFT_BOUNDARY.contains(&c));
        let right_ok = end == line.len()
            || line[end..]
                .chars()
                .next()
                .is_some_and(|c| RIGHT_BOUNDARY.contains(&c));
        let shell_escaped = line[..start].ends_with("$${");
        let recipe_ok = !is_recipe || has_var_open(&line[..start]);

        if left_ok && right_ok && !shell_escaped && recipe_ok {
            out.push_str(&line[copied..start]);
            out.push_str(new);
            copied = end;
            search = end;
        } else {
            // Step one character past this occurrence; a later
            // overlapping occurrence may still qualify.
            let step = line[start..].chars().next().map_or(1, char::len_utf8);
            search = start + step;
        }
    }

    out.push_str(&line[copied..]);
    out
}

/// Whether `s` ends with an unclosed `$(` or `${` variable reference.
///
/// Shell-escaped `$$` sequences do not open a Make reference.
pub fn has_var_open(s: &str) -> bool {
    let mut open = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => match chars.peek() {
                Some('(') => {
                    chars.next();
                    open.push(')');
                }
                Some('{') => {
                    chars.next();
                    open.push('}');
                }
                Some('$') => {
                    chars.next();
                }
                _ => {}
            },
            ')' | '}' if open.last() == Some(&c) => {
                open.pop();
            }
            _ => {}
        }
    }
    !open.is_empty()
}

/// Split `s` into maximal runs of whitespace and non-whitespace,
/// preserving every byte. Concatenating the result reproduces `s`.
pub fn split_preserving_whitespace(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, c) in s.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) {
            parts.push(&s[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < s.len() {
        parts.push(&s[start..]);
    }
    parts
}
