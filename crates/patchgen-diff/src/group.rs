//! Splitting an opcode list into context-bounded hunk groups.

use crate::opcode::{Opcode, Tag};

/// Lazily yields groups of opcodes, one per hunk.
///
/// Each group starts and ends with at most `context` lines of equal
/// context. An equal run longer than `2 * context` separates two groups;
/// shorter runs keep the surrounding changes in one group. Input without
/// changes yields nothing.
#[derive(Clone, Debug)]
pub struct GroupedOpcodes {
    opcodes: std::vec::IntoIter<Opcode>,
    context: usize,
    group: Vec<Opcode>,
}

impl GroupedOpcodes {
    pub fn new(mut opcodes: Vec<Opcode>, context: usize) -> Self {
        if let Some(first) = opcodes.first_mut().filter(|op| op.tag == Tag::Equal) {
            first.a_start = first.a_start.max(first.a_end.saturating_sub(context));
            first.b_start = first.b_start.max(first.b_end.saturating_sub(context));
        }
        if let Some(last) = opcodes.last_mut().filter(|op| op.tag == Tag::Equal) {
            last.a_end = last.a_end.min(last.a_start + context);
            last.b_end = last.b_end.min(last.b_start + context);
        }
        Self {
            opcodes: opcodes.into_iter(),
            context,
            group: Vec::new(),
        }
    }
}

impl Iterator for GroupedOpcodes {
    type Item = Vec<Opcode>;

    fn next(&mut self) -> Option<Vec<Opcode>> {
        let n = self.context;
        for op in self.opcodes.by_ref() {
            if op.tag == Tag::Equal && op.a_end - op.a_start > 2 * n {
                let mut done = std::mem::take(&mut self.group);
                done.push(Opcode::new(
                    Tag::Equal,
                    op.a_start,
                    op.a_end.min(op.a_start + n),
                    op.b_start,
                    op.b_end.min(op.b_start + n),
                ));
                self.group.push(Opcode::new(
                    Tag::Equal,
                    op.a_start.max(op.a_end.saturating_sub(n)),
                    op.a_end,
                    op.b_start.max(op.b_end.saturating_sub(n)),
                    op.b_end,
                ));
                return Some(done);
            }
            self.group.push(op);
        }

        let last = std::mem::take(&mut self.group);
        match last.as_slice() {
            [] => None,
            [only] if only.tag == Tag::Equal => None,
            _ => Some(last),
        }
    }
}
