//! Blocks of the simulated arena.

use core::ops::Range;

/// Identifier of an allocated block.
///
/// Identifiers are handed out by the engine in strictly increasing order
/// starting from [`BlockId::FIRST`] and are never reused, even after the
/// block they named has been freed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display, derive_more::From,
)]
pub struct BlockId(u64);

impl BlockId {
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum BlockState {
    Free,
    Allocated(BlockId),
}

impl BlockState {
    #[must_use]
    pub fn id(self) -> Option<BlockId> {
        match self {
            Self::Free => None,
            Self::Allocated(id) => Some(id),
        }
    }
}

/// A contiguous, non-empty run of units with a uniform state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    start: usize,
    size: usize,
    state: BlockState,
}

impl Block {
    pub(crate) fn free(start: usize, size: usize) -> Self {
        Self {
            start,
            size,
            state: BlockState::Free,
        }
    }

    pub(crate) fn allocated(start: usize, size: usize, id: BlockId) -> Self {
        Self {
            start,
            size,
            state: BlockState::Allocated(id),
        }
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// One past the last address covered by this block.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.size
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    #[must_use]
    pub fn state(&self) -> BlockState {
        self.state
    }

    #[must_use]
    pub fn id(&self) -> Option<BlockId> {
        self.state.id()
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.state.is_free()
    }

    pub(crate) fn grow(&mut self, size: usize) {
        self.size += size;
    }

    pub(crate) fn mark_free(&mut self) {
        self.state = BlockState::Free;
    }
}
