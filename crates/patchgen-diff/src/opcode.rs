//! Edit script primitives: matching blocks and opcodes.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A run of elements common to both sequences.
///
/// `a[a..a + size]` equals `b[b..b + size]` element-wise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Match {
    /// Start index in the old sequence.
    pub a: usize,
    /// Start index in the new sequence.
    pub b: usize,
    /// Number of matching elements.
    pub size: usize,
}

impl Match {
    pub fn new(a: usize, b: usize, size: usize) -> Self {
        Self { a, b, size }
    }
}

/// How a span of the old sequence relates to a span of the new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// Both spans hold the same elements.
    Equal,
    /// The new span was inserted; the old span is empty.
    Insert,
    /// The old span was deleted; the new span is empty.
    Delete,
    /// The old span was replaced by the new span.
    Replace,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Equal => "equal",
            Tag::Insert => "insert",
            Tag::Delete => "delete",
            Tag::Replace => "replace",
        };
        f.write_str(name)
    }
}

/// A tagged pair of half-open spans, one in each sequence.
///
/// A full opcode list tiles `0..a.len()` and `0..b.len()` with no gaps or
/// overlaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Opcode {
    pub tag: Tag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

impl Opcode {
    pub fn new(tag: Tag, a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Self {
        Self {
            tag,
            a_start,
            a_end,
            b_start,
            b_end,
        }
    }

    /// The span covered in the old sequence.
    pub fn old_range(&self) -> Range<usize> {
        self.a_start..self.a_end
    }

    /// The span covered in the new sequence.
    pub fn new_range(&self) -> Range<usize> {
        self.b_start..self.b_end
    }

    /// Returns `true` for every tag except [`Tag::Equal`].
    pub fn is_change(&self) -> bool {
        self.tag != Tag::Equal
    }

    /// The same edit seen from the other side: old and new swap, and so do
    /// inserts and deletes.
    pub fn inverted(&self) -> Self {
        let tag = match self.tag {
            Tag::Insert => Tag::Delete,
            Tag::Delete => Tag::Insert,
            other => other,
        };
        Self::new(tag, self.b_start, self.b_end, self.a_start, self.a_end)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{},{},{})",
            self.tag, self.a_start, self.a_end, self.b_start, self.b_end
        )
    }
}
