//! Line splitting helpers.

/// Split text into lines, keeping each line's terminator.
///
/// Only the final line can come back without a `'\n'`, and only when the
/// text does not end with one.
///
/// ```
/// use patchgen_diff::split_lines;
///
/// assert_eq!(split_lines("a\nb"), vec!["a\n", "b"]);
/// assert!(split_lines("").is_empty());
/// ```
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Junk predicate for lines that are blank or hold a single `#`.
pub fn is_blank_line(line: &str) -> bool {
    matches!(line.trim(), "" | "#")
}
