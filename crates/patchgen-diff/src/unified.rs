//! Unified diff rendering.
//!
//! Groups opcodes into [`DiffHunk`]s and renders them as the text `patch`
//! consumes: a `---`/`+++` header, then one `@@ -l,s +l,s @@` section per
//! hunk.

use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::group::GroupedOpcodes;
use crate::matcher::compute_opcodes;
use crate::opcode::{Opcode, Tag};

/// Marker line following a line that has no terminator.
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Labels and timestamps for the two file header lines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub from_file: String,
    pub to_file: String,
    /// Omitted from the `---` line, tab included, when empty.
    pub from_date: String,
    /// Omitted from the `+++` line, tab included, when empty.
    pub to_date: String,
}

impl Header {
    pub fn new(from_file: impl Into<String>, to_file: impl Into<String>) -> Self {
        Self {
            from_file: from_file.into(),
            to_file: to_file.into(),
            ..Self::default()
        }
    }

    pub fn with_dates(mut self, from_date: impl Into<String>, to_date: impl Into<String>) -> Self {
        self.from_date = from_date.into();
        self.to_date = to_date.into();
        self
    }

    /// The `---` and `+++` lines, each newline-terminated.
    pub fn lines(&self) -> [String; 2] {
        [
            format!("--- {}{}\n", self.from_file, date_suffix(&self.from_date)),
            format!("+++ {}{}\n", self.to_file, date_suffix(&self.to_date)),
        ]
    }
}

fn date_suffix(date: &str) -> String {
    if date.is_empty() {
        String::new()
    } else {
        format!("\t{date}")
    }
}

/// A contiguous region of changes with its surrounding context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    /// Line number in the old content where this hunk starts (1-based, or
    /// the preceding line when `old_count` is 0).
    pub old_start: usize,
    /// Number of lines from the old content in this hunk.
    pub old_count: usize,
    /// Line number in the new content where this hunk starts (1-based, or
    /// the preceding line when `new_count` is 0).
    pub new_start: usize,
    /// Number of lines from the new content in this hunk.
    pub new_count: usize,
    /// The individual diff lines, terminators included.
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    fn from_group<S: AsRef<str>>(group: &[Opcode], a: &[S], b: &[S]) -> Option<Self> {
        let (first, last) = (group.first()?, group.last()?);
        let (old_start, old_count) = hunk_range(first.a_start, last.a_end);
        let (new_start, new_count) = hunk_range(first.b_start, last.b_end);

        let mut lines = Vec::new();
        for op in group {
            let (old, new) = (&a[op.old_range()], &b[op.new_range()]);
            match op.tag {
                Tag::Equal => lines.extend(tagged(old, DiffLine::Context)),
                Tag::Delete => lines.extend(tagged(old, DiffLine::Removed)),
                Tag::Insert => lines.extend(tagged(new, DiffLine::Added)),
                Tag::Replace => {
                    lines.extend(tagged(old, DiffLine::Removed));
                    lines.extend(tagged(new, DiffLine::Added));
                }
            }
        }

        Some(Self {
            old_start,
            old_count,
            new_start,
            new_count,
            lines,
        })
    }

    /// The `@@ -l,s +l,s @@` line.
    pub fn range_line(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@\n",
            self.old_start, self.old_count, self.new_start, self.new_count
        )
    }

    /// Every output line of this hunk, header first.
    pub fn rendered_lines(&self) -> Vec<String> {
        let mut out = vec![self.range_line()];
        for line in &self.lines {
            line.render_into(&mut out);
        }
        out
    }
}

impl fmt::Display for DiffHunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.rendered_lines().iter().try_for_each(|l| f.write_str(l))
    }
}

fn tagged<S: AsRef<str>>(
    lines: &[S],
    kind: fn(String) -> DiffLine,
) -> impl Iterator<Item = DiffLine> + '_ {
    lines.iter().map(move |l| kind(l.as_ref().to_string()))
}

/// 1-based start and count for the half-open span `start..end`.
fn hunk_range(start: usize, end: usize) -> (usize, usize) {
    let count = end - start;
    if count == 0 {
        (start, 0)
    } else {
        (start + 1, count)
    }
}

/// A single line in a diff hunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum DiffLine {
    /// A line present in both old and new (context).
    Context(String),
    /// A line added in the new content.
    Added(String),
    /// A line removed from the old content.
    Removed(String),
}

impl DiffLine {
    pub fn prefix(&self) -> char {
        match self {
            DiffLine::Context(_) => ' ',
            DiffLine::Added(_) => '+',
            DiffLine::Removed(_) => '-',
        }
    }

    pub fn text(&self) -> &str {
        match self {
            DiffLine::Context(text) | DiffLine::Added(text) | DiffLine::Removed(text) => text,
        }
    }

    fn render_into<E: Extend<String>>(&self, out: &mut E) {
        let text = self.text();
        if text.ends_with('\n') {
            out.extend([format!("{}{text}", self.prefix())]);
        } else {
            out.extend([
                format!("{}{text}\n", self.prefix()),
                format!("{NO_NEWLINE_MARKER}\n"),
            ]);
        }
    }
}

/// Lazily builds one [`DiffHunk`] per opcode group.
pub struct Hunks<'a, S> {
    a: &'a [S],
    b: &'a [S],
    groups: GroupedOpcodes,
}

impl<S: AsRef<str>> Iterator for Hunks<'_, S> {
    type Item = DiffHunk;

    fn next(&mut self) -> Option<DiffHunk> {
        let group = self.groups.next()?;
        DiffHunk::from_group(&group, self.a, self.b)
    }
}

/// Group `opcodes` into hunks carrying `context` lines of context.
pub fn hunks<'a, S: AsRef<str>>(
    a: &'a [S],
    b: &'a [S],
    opcodes: Vec<Opcode>,
    context: usize,
) -> Hunks<'a, S> {
    Hunks {
        a,
        b,
        groups: GroupedOpcodes::new(opcodes, context),
    }
}

/// Lazy, single-pass stream of unified diff output lines.
///
/// Every item ends with `'\n'`. Nothing at all is produced, header
/// included, when the inputs have no differences.
pub struct UnifiedLines<'a, S> {
    hunks: Hunks<'a, S>,
    header: Header,
    started: bool,
    pending: VecDeque<String>,
}

impl<S: AsRef<str>> Iterator for UnifiedLines<'_, S> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(line);
            }
            let hunk = self.hunks.next()?;
            if !self.started {
                self.started = true;
                self.pending.extend(self.header.lines());
            }
            self.pending.push_back(hunk.range_line());
            for line in &hunk.lines {
                line.render_into(&mut self.pending);
            }
        }
    }
}

/// Render `opcodes` between `a` and `b` as unified diff lines.
pub fn format<'a, S: AsRef<str>>(
    a: &'a [S],
    b: &'a [S],
    opcodes: Vec<Opcode>,
    context: usize,
    header: Header,
) -> UnifiedLines<'a, S> {
    UnifiedLines {
        hunks: hunks(a, b, opcodes, context),
        header,
        started: false,
        pending: VecDeque::new(),
    }
}

/// Diff `a` against `b` with the default matcher and render the result.
///
/// # Examples
///
/// ```
/// use patchgen_diff::{unified_diff, Header};
///
/// let old = ["a\n", "b\n", "c\n"];
/// let new = ["a\n", "x\n", "c\n"];
/// let text: String = unified_diff(&old, &new, 3, Header::new("old", "new")).collect();
/// assert_eq!(text, "--- old\n+++ new\n@@ -1,3 +1,3 @@\n a\n-b\n+x\n c\n");
/// ```
pub fn unified_diff<'a, S: AsRef<str> + Hash + Eq>(
    a: &'a [S],
    b: &'a [S],
    context: usize,
    header: Header,
) -> UnifiedLines<'a, S> {
    format(a, b, compute_opcodes(a, b), context, header)
}

/// The complete, collected result of diffing two files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    #[serde(flatten)]
    pub header: Header,
    /// The diff hunks.
    pub hunks: Vec<DiffHunk>,
    /// Total number of lines in the old content.
    pub old_lines: usize,
    /// Total number of lines in the new content.
    pub new_lines: usize,
}

impl FileDiff {
    pub fn new<S: AsRef<str>>(
        a: &[S],
        b: &[S],
        opcodes: Vec<Opcode>,
        context: usize,
        header: Header,
    ) -> Self {
        Self {
            header,
            hunks: hunks(a, b, opcodes, context).collect(),
            old_lines: a.len(),
            new_lines: b.len(),
        }
    }

    /// Returns `true` if the two files are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Total number of lines added across all hunks.
    pub fn additions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    /// Total number of lines removed across all hunks.
    pub fn deletions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }
}

impl fmt::Display for FileDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        for line in self.header.lines() {
            f.write_str(&line)?;
        }
        self.hunks.iter().try_for_each(|h| write!(f, "{h}"))
    }
}
