//! Head-and-tail truncation of long documents.
//!
//! Introductions and conclusions carry most of an article's signal, so long
//! text keeps its first 2000 and last 1000 characters joined by an ellipsis
//! line. Lengths are counted in characters, never bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Default character budget for text sent to the backend.
pub const DEFAULT_MAX_CHARS: usize = 4000;

/// Characters kept from the start of an over-budget text.
pub const HEAD_CHARS: usize = 2000;

/// Characters kept from the end of an over-budget text.
pub const TAIL_CHARS: usize = 1000;

/// Line inserted between head and tail.
pub const SEPARATOR: &str = "\n……\n";

/// Smallest budget a clamped text fits in: head, separator and tail.
pub const MIN_MAX_CHARS: usize = HEAD_CHARS + TAIL_CHARS + 4;

static TRAILING_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+\n").expect("static regex is valid"));

/// Remove runs of spaces and tabs that sit right before a line break.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    TRAILING_WS.replace_all(text, "\n")
}

/// Clamp `text` to `max_chars`, keeping head and tail context.
///
/// After trailing-whitespace normalization, text within budget is returned
/// unchanged. Anything longer becomes the first [`HEAD_CHARS`] characters,
/// [`SEPARATOR`], and the last [`TAIL_CHARS`] characters.
///
/// `max_chars` must be at least [`MIN_MAX_CHARS`]; `Settings` refuses smaller budgets.
pub fn clamp(text: &str, max_chars: usize) -> String {
    debug_assert!(max_chars >= MIN_MAX_CHARS, "clamp budget {max_chars} below {MIN_MAX_CHARS}");
    let normalized = normalize_line_endings(text);
    let total = normalized.chars().count();
    if total <= max_chars {
        return normalized.into_owned();
    }

    let head_end = byte_offset(&normalized, HEAD_CHARS);
    let tail_start = byte_offset(&normalized, total.saturating_sub(TAIL_CHARS));

    let mut out = String::with_capacity(head_end + SEPARATOR.len() + normalized.len() - tail_start);
    out.push_str(&normalized[..head_end]);
    out.push_str(SEPARATOR);
    out.push_str(&normalized[tail_start..]);
    out
}

/// Byte offset of the `n`th character, or the string length past the end.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}
