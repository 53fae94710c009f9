//! Core identifier and range types shared across the crate.
//!
//! Newtype-over-`NonZeroU32` ids, extended with `BlockId`, which is not a
//! bare counter: a block's id is derived from its owning file's id plus a
//! per-file monotonically increasing counter, so two deterministic runs over
//! the same file assignment reproduce identical ids without a separate
//! mapping table.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(NonZeroU32);

/// A block id packs the owning file id into the high 32 bits and the
/// per-file counter into the low 32 bits. This makes `BlockId -> FileId`
/// recoverable by construction and needs no side table to survive restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u64);

impl ProjectId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0.get()
    }
}

impl FileId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0.get()
    }
}

impl BlockId {
    /// `counter` is 1-based and must be nonzero: it is the n-th block
    /// emitted for `file_id` during this ingest.
    pub fn new(file_id: FileId, counter: u32) -> Self {
        Self(((file_id.value() as u64) << 32) | counter as u64)
    }

    pub fn file_id(&self) -> FileId {
        FileId::new((self.0 >> 32) as u32).expect("BlockId always packs a nonzero FileId")
    }

    pub fn counter(&self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-file monotonically increasing counter used to assign `BlockId`s.
/// Parents are always assigned before children (pre-order emission), per
/// the extraction contract.
#[derive(Debug)]
pub struct BlockIdCounter {
    file_id: FileId,
    next: u32,
}

impl BlockIdCounter {
    pub fn new(file_id: FileId) -> Self {
        Self { file_id, next: 1 }
    }

    pub fn next_id(&mut self) -> BlockId {
        let id = BlockId::new(self.file_id, self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Range {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Number of source lines this range spans, inclusive on both ends.
    /// This is the exact definition the nested-function hoister's 300-line
    /// trigger uses (this fixes the "does the header count" ambiguity by
    /// counting the header line).
    pub fn line_span(&self) -> u32 {
        self.end_line - self.start_line + 1
    }

    pub fn contains(&self, other: &Range) -> bool {
        self.start_line <= other.start_line && other.end_line <= self.end_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_id_round_trips_file_id_and_counter() {
        let file_id = FileId::new(7).unwrap();
        let block_id = BlockId::new(file_id, 3);
        assert_eq!(block_id.file_id(), file_id);
        assert_eq!(block_id.counter(), 3);
    }

    #[test]
    fn block_id_counter_is_monotonic_and_one_based() {
        let file_id = FileId::new(1).unwrap();
        let mut counter = BlockIdCounter::new(file_id);
        let a = counter.next_id();
        let b = counter.next_id();
        assert_eq!(a.counter(), 1);
        assert_eq!(b.counter(), 2);
    }

    #[test]
    fn range_line_span_is_inclusive() {
        let r = Range::new(10, 0, 10, 5);
        assert_eq!(r.line_span(), 1);
        let r2 = Range::new(10, 0, 309, 5);
        assert_eq!(r2.line_span(), 300);
    }

    #[test]
    fn range_contains_checks_line_bounds_only() {
        let parent = Range::new(1, 0, 100, 0);
        let child = Range::new(10, 4, 20, 1);
        assert!(parent.contains(&child));
        assert!(!child.contains(&parent));
    }
}
