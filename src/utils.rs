//! Small string helpers used throughout the application.
//!
//! - Log-friendly truncation of long model output
//! - Line-wise whitespace cleanup for text pulled out of HTML

use itertools::Itertools;

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended. Cuts always land on a character boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Collapse whitespace inside each line and drop blank lines.
///
/// HTML text nodes arrive with indentation, runs of spaces and empty lines
/// from the markup; this keeps one space between words and one line break
/// between blocks.
pub fn tidy_lines(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().join(" "))
        .filter(|line| !line.is_empty())
        .join("\n")
}
