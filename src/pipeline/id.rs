//! Positional identity for stages in a pipeline.
//!
//! A [`StageIndex`] is the 0-based position of a stage in
//! `FilterPipeline::slots` and doubles as a direct array index. Indices are
//! reassigned as a unit whenever the stage list is edited, so an index is
//! only meaningful until the next list mutation.

use std::fmt;

/// Index into `FilterPipeline::slots`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StageIndex(pub u32);

impl StageIndex {
    pub const INVALID: StageIndex = StageIndex(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The neighbour before this stage, if any.
    #[inline]
    pub fn previous(self) -> Option<StageIndex> {
        if self.is_valid() && self.0 > 0 {
            Some(StageIndex(self.0 - 1))
        } else {
            None
        }
    }

    /// The neighbour after this stage in a pipeline of `len` stages.
    #[inline]
    pub fn next(self, len: usize) -> Option<StageIndex> {
        let next = self.index() + 1;
        (self.is_valid() && next < len).then(|| StageIndex(next as u32))
    }
}

impl From<usize> for StageIndex {
    fn from(index: usize) -> Self {
        StageIndex(index as u32)
    }
}

impl fmt::Debug for StageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "StageIndex(INVALID)")
        } else {
            write!(f, "StageIndex({})", self.0)
        }
    }
}

impl fmt::Display for StageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_index() {
        let id = StageIndex(3);
        assert!(id.is_valid());
        assert_eq!(id.index(), 3);
        assert!(!StageIndex::INVALID.is_valid());
    }

    #[test]
    fn test_neighbours() {
        let first = StageIndex(0);
        assert_eq!(first.previous(), None);
        assert_eq!(first.next(2), Some(StageIndex(1)));
        assert_eq!(StageIndex(1).next(2), None);
        assert_eq!(StageIndex(1).previous(), Some(first));
        assert_eq!(StageIndex::INVALID.next(10), None);
    }
}
