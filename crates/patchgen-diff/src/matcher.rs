//! Longest-matching-block sequence matcher.
//!
//! Finds the longest contiguous block common to both sequences, then repeats
//! on the pieces to its left and right. The resulting blocks are turned into
//! an opcode list that tiles both sequences.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::iter;

use crate::group::GroupedOpcodes;
use crate::opcode::{Match, Opcode, Tag};

/// Popularity pruning only applies to new sequences at least this long.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Predicate marking elements that must never anchor a match.
pub type JunkPredicate<'p, T> = Box<dyn Fn(&T) -> bool + 'p>;

/// Compute the opcodes turning `a` into `b` with the default matcher.
///
/// # Examples
///
/// ```
/// use patchgen_diff::{compute_opcodes, Opcode, Tag};
///
/// let a = ["a\n", "b\n", "c\n"];
/// let b = ["a\n", "x\n", "c\n"];
/// assert_eq!(
///     compute_opcodes(&a, &b),
///     vec![
///         Opcode::new(Tag::Equal, 0, 1, 0, 1),
///         Opcode::new(Tag::Replace, 1, 2, 1, 2),
///         Opcode::new(Tag::Equal, 2, 3, 2, 3),
///     ]
/// );
/// ```
pub fn compute_opcodes<T: Hash + Eq>(a: &[T], b: &[T]) -> Vec<Opcode> {
    SequenceMatcher::new(a, b).opcodes()
}

/// Configures junk handling before the index over the new sequence is built.
pub struct MatcherBuilder<'p, T> {
    junk: Option<JunkPredicate<'p, T>>,
    autojunk: bool,
}

impl<'p, T: Hash + Eq> MatcherBuilder<'p, T> {
    pub fn new() -> Self {
        Self {
            junk: None,
            autojunk: true,
        }
    }

    /// Exclude every element for which `predicate` holds from the index.
    ///
    /// Junk elements can still extend a match found elsewhere, but never
    /// start one.
    pub fn junk<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'p,
    {
        self.junk = Some(Box::new(predicate));
        self
    }

    /// Toggle popularity pruning. When enabled and the new sequence has at
    /// least 200 elements, any element occurring more than 1% + 1 times is
    /// dropped from the index.
    pub fn autojunk(mut self, enabled: bool) -> Self {
        self.autojunk = enabled;
        self
    }

    pub fn build<'a>(self, a: &'a [T], b: &'a [T]) -> SequenceMatcher<'a, T> {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, elem) in b.iter().enumerate() {
            b2j.entry(elem).or_default().push(j);
        }

        let mut junk = HashSet::new();
        if let Some(is_junk) = &self.junk {
            b2j.retain(|elem, _| {
                if is_junk(*elem) {
                    junk.insert(*elem);
                    false
                } else {
                    true
                }
            });
        }

        let mut popular = HashSet::new();
        if self.autojunk && b.len() >= AUTOJUNK_MIN_LEN {
            let threshold = b.len() / 100 + 1;
            b2j.retain(|elem, positions| {
                if positions.len() > threshold {
                    popular.insert(*elem);
                    false
                } else {
                    true
                }
            });
        }

        SequenceMatcher {
            a,
            b,
            b2j,
            junk,
            popular,
        }
    }
}

impl<T: Hash + Eq> Default for MatcherBuilder<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches an old sequence `a` against a new sequence `b`.
///
/// The inverted index over `b` lives only as long as the matcher; nothing is
/// shared between matchers.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a T, Vec<usize>>,
    junk: HashSet<&'a T>,
    popular: HashSet<&'a T>,
}

impl<'a, T: Hash + Eq> SequenceMatcher<'a, T> {
    /// A matcher with no junk predicate and popularity pruning enabled.
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        MatcherBuilder::new().build(a, b)
    }

    pub fn builder<'p>() -> MatcherBuilder<'p, T> {
        MatcherBuilder::new()
    }

    /// Number of distinct elements dropped from the index for being too
    /// common.
    pub fn popular_len(&self) -> usize {
        self.popular.len()
    }

    fn is_junk(&self, elem: &T) -> bool {
        self.junk.contains(elem)
    }

    /// Find the longest block common to `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    /// If nothing matches, the result is `(alo, blo, 0)`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (a, b) = (self.a, self.b);
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] is the length of the match ending at a[i - 1] and b[j].
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        let mut next: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            next.clear();
            if let Some(positions) = self.b2j.get(&a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            std::mem::swap(&mut j2len, &mut next);
        }

        // Grow through equal elements the index never saw: popular ones
        // first, then junk.
        for junk_pass in [false, true] {
            while best_i > alo
                && best_j > blo
                && self.is_junk(&b[best_j - 1]) == junk_pass
                && a[best_i - 1] == b[best_j - 1]
            {
                best_i -= 1;
                best_j -= 1;
                best_size += 1;
            }
            while best_i + best_size < ahi
                && best_j + best_size < bhi
                && self.is_junk(&b[best_j + best_size]) == junk_pass
                && a[best_i + best_size] == b[best_j + best_size]
            {
                best_size += 1;
            }
        }

        Match::new(best_i, best_j, best_size)
    }

    /// All matching blocks, ordered and non-overlapping, with adjacent
    /// blocks merged. Never contains an empty block.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());
        if self.a == self.b {
            return if la == 0 {
                Vec::new()
            } else {
                vec![Match::new(0, 0, la)]
            };
        }

        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
        }
        blocks.sort_unstable();

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len());
        for m in blocks {
            match merged.last_mut() {
                Some(last) if last.a + last.size == m.a && last.b + last.size == m.b => {
                    last.size += m.size;
                }
                _ => merged.push(m),
            }
        }
        merged
    }

    /// The edit script turning `a` into `b`.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let sentinel = Match::new(self.a.len(), self.b.len(), 0);
        let mut opcodes = Vec::new();
        let (mut i, mut j) = (0, 0);
        for m in self.matching_blocks().into_iter().chain(iter::once(sentinel)) {
            let tag = match (i < m.a, j < m.b) {
                (true, true) => Some(Tag::Replace),
                (true, false) => Some(Tag::Delete),
                (false, true) => Some(Tag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                opcodes.push(Opcode::new(tag, i, m.a, j, m.b));
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                opcodes.push(Opcode::new(Tag::Equal, m.a, i, m.b, j));
            }
        }
        opcodes
    }

    /// Opcodes grouped into hunks with `context` lines of equal context.
    pub fn grouped_opcodes(&self, context: usize) -> GroupedOpcodes {
        GroupedOpcodes::new(self.opcodes(), context)
    }

    /// Similarity in `[0, 1]`: twice the matched elements over the total.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matched as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn replay<T: Clone>(a: &[T], b: &[T], opcodes: &[Opcode]) -> Vec<T> {
        opcodes
            .iter()
            .flat_map(|op| match op.tag {
                Tag::Equal => a[op.old_range()].to_vec(),
                Tag::Delete => Vec::new(),
                Tag::Insert | Tag::Replace => b[op.new_range()].to_vec(),
            })
            .collect()
    }

    fn tokens(prefix: &str, n: usize) -> impl Iterator<Item = String> + '_ {
        (0..n).map(move |k| format!("{prefix}{k}"))
    }

    #[test]
    fn longest_match_prefers_whole_block() {
        let (a, b) = (chars(" abcd"), chars("abcd abcd"));
        let m = SequenceMatcher::new(&a, &b).find_longest_match(0, 5, 0, 9);
        assert_eq!(m, Match::new(0, 4, 5));
    }

    #[test]
    fn junk_cannot_anchor_a_match() {
        let (a, b) = (chars(" abcd"), chars("abcd abcd"));
        let matcher = SequenceMatcher::builder().junk(|c: &char| *c == ' ').build(&a, &b);
        assert_eq!(matcher.find_longest_match(0, 5, 0, 9), Match::new(1, 0, 4));
    }

    #[test]
    fn junk_extends_an_existing_match() {
        let (a, b) = (chars("x y"), chars("x y"));
        let matcher = SequenceMatcher::builder().junk(|c: &char| *c == ' ').build(&a, &b);
        // The space is absorbed; the trailing `y` is not junk and stays out.
        assert_eq!(matcher.find_longest_match(0, 3, 0, 3), Match::new(0, 0, 2));
    }

    #[test]
    fn earliest_block_wins_ties() {
        let (a, b) = (chars("xy"), chars("yx"));
        let m = SequenceMatcher::new(&a, &b).find_longest_match(0, 2, 0, 2);
        assert_eq!(m, Match::new(0, 1, 1));
    }

    #[test]
    fn no_match_reports_range_start() {
        let (a, b) = (chars("abc"), chars("xyz"));
        let m = SequenceMatcher::new(&a, &b).find_longest_match(1, 3, 2, 3);
        assert_eq!(m, Match::new(1, 2, 0));
    }

    #[test]
    fn matching_blocks_are_merged_and_unterminated() {
        let (a, b) = (chars("abxcd"), chars("abcd"));
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
        assert_eq!(blocks, vec![Match::new(0, 0, 2), Match::new(3, 2, 2)]);
    }

    #[test]
    fn opcodes_cover_every_tag() {
        let (a, b) = (chars("qabxcd"), chars("abycdf"));
        assert_eq!(
            compute_opcodes(&a, &b),
            vec![
                Opcode::new(Tag::Delete, 0, 1, 0, 0),
                Opcode::new(Tag::Equal, 1, 3, 0, 2),
                Opcode::new(Tag::Replace, 3, 4, 2, 3),
                Opcode::new(Tag::Equal, 4, 6, 3, 5),
                Opcode::new(Tag::Insert, 6, 6, 5, 6),
            ]
        );
    }

    #[test]
    fn single_line_replacement() {
        let a = ["a\n", "b\n", "c\n"];
        let b = ["a\n", "x\n", "c\n"];
        assert_eq!(
            compute_opcodes(&a, &b),
            vec![
                Opcode::new(Tag::Equal, 0, 1, 0, 1),
                Opcode::new(Tag::Replace, 1, 2, 1, 2),
                Opcode::new(Tag::Equal, 2, 3, 2, 3),
            ]
        );
    }

    #[test]
    fn empty_sequences() {
        let empty: [&str; 0] = [];
        let lines = ["hello\n", "world\n"];
        assert!(compute_opcodes(&empty, &empty).is_empty());
        assert_eq!(
            compute_opcodes(&empty, &lines),
            vec![Opcode::new(Tag::Insert, 0, 0, 0, 2)]
        );
        assert_eq!(
            compute_opcodes(&lines, &empty),
            vec![Opcode::new(Tag::Delete, 0, 2, 0, 0)]
        );
    }

    #[test]
    fn popular_lines_are_pruned_only_when_enabled() {
        let mut b: Vec<&str> = vec!["\n"; 250];
        b.push("end\n");
        let a = vec!["\n", "end\n"];

        let pruned = SequenceMatcher::new(&a, &b);
        assert_eq!(pruned.popular_len(), 1);
        assert_eq!(replay(&a, &b, &pruned.opcodes()), b);

        let exact = SequenceMatcher::builder().autojunk(false).build(&a, &b);
        assert_eq!(exact.popular_len(), 0);
        assert_eq!(replay(&a, &b, &exact.opcodes()), b);
    }

    #[test]
    fn identical_popular_input_is_one_block() {
        let lines: Vec<&str> = (0..300).map(|i| if i % 2 == 0 { "\n" } else { "x\n" }).collect();
        assert_eq!(
            compute_opcodes(&lines, &lines),
            vec![Opcode::new(Tag::Equal, 0, 300, 0, 300)]
        );
    }

    #[test]
    fn ratio_counts_matched_elements() {
        let (a, b) = (chars("abcd"), chars("bcde"));
        assert_eq!(SequenceMatcher::new(&a, &b).ratio(), 0.75);
        let empty: [char; 0] = [];
        assert_eq!(SequenceMatcher::new(&empty, &empty).ratio(), 1.0);
        assert_eq!(SequenceMatcher::new(&a, &empty).ratio(), 0.0);
    }

    proptest! {
        #[test]
        fn opcodes_tile_both_sequences(
            a in prop::collection::vec(0u8..4, 0..40),
            b in prop::collection::vec(0u8..4, 0..40),
        ) {
            let opcodes = compute_opcodes(&a, &b);
            let (mut i, mut j) = (0, 0);
            for op in &opcodes {
                prop_assert_eq!(op.a_start, i);
                prop_assert_eq!(op.b_start, j);
                let (la, lb) = (op.a_end - op.a_start, op.b_end - op.b_start);
                match op.tag {
                    Tag::Equal => {
                        prop_assert!(la > 0);
                        prop_assert_eq!(&a[op.old_range()], &b[op.new_range()]);
                    }
                    Tag::Insert => prop_assert!(la == 0 && lb > 0),
                    Tag::Delete => prop_assert!(la > 0 && lb == 0),
                    Tag::Replace => prop_assert!(la > 0 && lb > 0),
                }
                i = op.a_end;
                j = op.b_end;
            }
            prop_assert_eq!(i, a.len());
            prop_assert_eq!(j, b.len());
        }

        #[test]
        fn opcodes_reconstruct_new(
            a in prop::collection::vec(0u8..4, 0..40),
            b in prop::collection::vec(0u8..4, 0..40),
        ) {
            let opcodes = compute_opcodes(&a, &b);
            prop_assert_eq!(replay(&a, &b, &opcodes), b);
        }

        #[test]
        fn matching_blocks_are_ordered_and_nonempty(
            a in prop::collection::vec(0u8..3, 0..30),
            b in prop::collection::vec(0u8..3, 0..30),
        ) {
            let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
            for m in &blocks {
                prop_assert!(m.size > 0);
            }
            for pair in blocks.windows(2) {
                prop_assert!(pair[0].a + pair[0].size <= pair[1].a);
                prop_assert!(pair[0].b + pair[0].size <= pair[1].b);
            }
        }

        #[test]
        fn identical_sequences_are_one_equal(a in prop::collection::vec(0u8..4, 1..40)) {
            let opcodes = compute_opcodes(&a, &a);
            prop_assert_eq!(opcodes, vec![Opcode::new(Tag::Equal, 0, a.len(), 0, a.len())]);
        }

        #[test]
        fn unambiguous_edits_are_symmetric(
            prefix in 0usize..6,
            suffix in 0usize..6,
            removed in 0usize..4,
            added in 0usize..4,
        ) {
            let build = |middle: &str, n: usize| -> Vec<String> {
                tokens("p", prefix)
                    .chain(tokens(middle, n))
                    .chain(tokens("s", suffix))
                    .collect()
            };
            let a = build("x", removed);
            let b = build("y", added);

            let forward = compute_opcodes(&a, &b);
            let backward: Vec<Opcode> = compute_opcodes(&b, &a).iter().map(Opcode::inverted).collect();
            prop_assert_eq!(forward, backward);
        }
    }
}
