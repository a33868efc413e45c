//! Cursor-oriented text helpers used by the capability handlers.

use crate::base::Position;

/// Check if a character is part of an identifier (Unicode XID_Continue).
#[inline]
pub fn is_word_character(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[inline]
fn is_qualified_name_character(c: char) -> bool {
    is_word_character(c) || c == ':'
}

/// The text of line `line`, without its terminator.
pub fn line_text(text: &str, line: usize) -> Option<&str> {
    text.split('\n')
        .nth(line)
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
}

/// Character range `[start, end)` of the run matching `accept` around `column`.
///
/// A cursor sitting just after the run (the usual caret position after typing)
/// still selects it.
fn run_around(chars: &[char], column: usize, accept: fn(char) -> bool) -> Option<(usize, usize)> {
    let anchor = if chars.get(column).copied().is_some_and(accept) {
        column
    } else if column > 0 && chars.get(column - 1).copied().is_some_and(accept) {
        column - 1
    } else {
        return None;
    };

    let mut start = anchor;
    while start > 0 && accept(chars[start - 1]) {
        start -= 1;
    }
    let mut end = anchor;
    while end < chars.len() && accept(chars[end]) {
        end += 1;
    }
    Some((start, end))
}

/// Extract the identifier under (or immediately before) the cursor.
///
/// # Example
/// ```
/// use syster_session::base::Position;
/// use syster_session::core::text_utils::word_at;
///
/// let text = "part def Vehicle;\npart car : Vehicle;";
/// assert_eq!(word_at(text, Position::new(1, 12)), Some("Vehicle".to_string()));
/// assert_eq!(word_at(text, Position::new(0, 16)), Some("Vehicle".to_string()));
/// assert_eq!(word_at(text, Position::new(0, 4)), Some("part".to_string()));
/// ```
pub fn word_at(text: &str, position: Position) -> Option<String> {
    let chars: Vec<char> = line_text(text, position.line)?.chars().collect();
    let (start, end) = run_around(&chars, position.column, is_word_character)?;
    Some(chars[start..end].iter().collect())
}

/// Extract a `::`-qualified name under the cursor.
///
/// Returns `None` for plain identifiers and for single-colon type annotations
/// (`attr:String`); use [`word_at`] for those.
pub fn qualified_name_at(text: &str, position: Position) -> Option<String> {
    let chars: Vec<char> = line_text(text, position.line)?.chars().collect();
    let (start, end) = run_around(&chars, position.column, is_qualified_name_character)?;
    let run: String = chars[start..end].iter().collect();
    let trimmed = run.trim_matches(':');
    trimmed.contains("::").then(|| trimmed.to_string())
}

/// The identifier characters typed immediately before the cursor.
pub fn prefix_at(text: &str, position: Position) -> String {
    let Some(line) = line_text(text, position.line) else {
        return String::new();
    };
    let before: Vec<char> = line.chars().take(position.column).collect();
    let start = before
        .iter()
        .rposition(|c| !is_word_character(*c))
        .map_or(0, |i| i + 1);
    before[start..].iter().collect()
}
