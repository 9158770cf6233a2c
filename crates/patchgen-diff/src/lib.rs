//! Line diff engine for patchgen.
//!
//! Computes an edit script between two line sequences with a
//! longest-matching-block matcher and renders it in the unified diff format.
//! Everything here is pure: no I/O, no logging, no retained state.
//!
//! # Key Types
//!
//! - [`SequenceMatcher`] / [`MatcherBuilder`] -- Matching blocks and opcodes, with junk handling
//! - [`Opcode`] / [`Tag`] / [`Match`] -- The edit script
//! - [`GroupedOpcodes`] -- Opcodes split into context-bounded hunk groups
//! - [`UnifiedLines`] / [`DiffHunk`] / [`FileDiff`] -- Unified diff output

pub mod group;
pub mod lines;
pub mod matcher;
pub mod opcode;
pub mod unified;

pub use group::GroupedOpcodes;
pub use lines::{is_blank_line, split_lines};
pub use matcher::{compute_opcodes, JunkPredicate, MatcherBuilder, SequenceMatcher};
pub use opcode::{Match, Opcode, Tag};
pub use unified::{
    format, hunks, unified_diff, DiffHunk, DiffLine, FileDiff, Header, Hunks, UnifiedLines,
    NO_NEWLINE_MARKER,
};
