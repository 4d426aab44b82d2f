//! Small helpers shared across modules.
//!
//! - Case-insensitive keyword matching used by the feed filter
//! - String truncation for logs and error messages
//! - The interactive query prompt

use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::NewsError;

/// Prompt printed before reading the query from the terminal.
pub const QUERY_PROMPT: &str = "Enter your search query: ";

/// True when `haystack` contains `needle`, ignoring case.
///
/// Both sides are lowercased first, so `needle` is matched as a plain
/// substring and not as a word.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes, on a character boundary, with
/// an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Print [`QUERY_PROMPT`] to `output` and read one line from `input`.
///
/// Only the line terminator is stripped; inner and leading whitespace are
/// kept. A query that is empty after trimming is rejected.
pub fn read_query<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<String, NewsError> {
    write!(output, "{QUERY_PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let query = line.trim_end_matches(['\n', '\r']).to_string();
    debug!(%query, "Read query from terminal");

    if query.trim().is_empty() {
        return Err(NewsError::EmptyQuery);
    }
    Ok(query)
}
