//! The block table: an address-ordered partition of the arena.
//!
//! The table always covers `[0, capacity)` exactly, with consecutive blocks
//! touching end to start. Mutation happens only through two primitives:
//!
//! - [`split_allocate`](BlockTable::split_allocate) turns the head of a free
//!   block into an allocated block and keeps the remainder free;
//! - [`release`](BlockTable::release) followed by
//!   [`coalesce`](BlockTable::coalesce) frees a block and merges every run
//!   of adjacent free blocks into one.
//!
//! ```text
//! alloc 30, alloc 20, free 1:
//!
//! ┌──────────────┬──────────┬───────────────────────────┐
//! │ Free  0..30  │ #2 30..50│ Free 50..100              │
//! └──────────────┴──────────┴───────────────────────────┘
//! ```

use std::{collections::HashSet, mem, slice};

use crate::block::{Block, BlockId};

/// A broken table invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[non_exhaustive]
pub enum InvariantViolation {
    #[display("block table is empty")]
    Empty,
    #[display("block starting at {start} is empty")]
    EmptyBlock { start: usize },
    #[display("block starts at {actual}, expected {expected}")]
    Discontiguous { expected: usize, actual: usize },
    #[display("blocks end at {end}, capacity is {capacity}")]
    CoverageMismatch { end: usize, capacity: usize },
    #[display("free block at {start} follows another free block")]
    AdjacentFree { start: usize },
    #[display("block id {id} appears more than once")]
    DuplicateId { id: BlockId },
}

/// A reference to a block picked out of the table by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub(crate) index: usize,
    pub(crate) block: Block,
}

impl BlockRef {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn block(&self) -> &Block {
        &self.block
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTable {
    capacity: usize,
    blocks: Vec<Block>,
}

impl BlockTable {
    /// Creates a table with a single free block spanning `capacity` units.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            capacity,
            blocks: vec![Block::free(0, capacity)],
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Block] {
        &self.blocks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Free blocks holding at least `size` units, in address order.
    pub fn candidates(&self, size: usize) -> impl Iterator<Item = BlockRef> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter(move |(_, block)| block.is_free() && block.size() >= size)
            .map(|(index, block)| BlockRef {
                index,
                block: *block,
            })
    }

    pub(crate) fn find_allocated(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id() == Some(id))
    }

    /// Allocates the first `size` units of the free block at `index`.
    ///
    /// Any remainder becomes a new free block placed right after the
    /// allocated one.
    ///
    /// # Panics
    ///
    /// Panics if the block at `index` is not free or is smaller than `size`,
    /// or if `size` is zero.
    pub(crate) fn split_allocate(&mut self, index: usize, size: usize, id: BlockId) -> Block {
        let chosen = self.blocks[index];
        assert!(chosen.is_free(), "block at {} is not free", chosen.start());
        assert!(
            size > 0 && size <= chosen.size(),
            "cannot allocate {size} units from a block of {}",
            chosen.size()
        );

        let allocated = Block::allocated(chosen.start(), size, id);
        self.blocks[index] = allocated;
        if chosen.size() > size {
            let leftover = Block::free(allocated.end(), chosen.size() - size);
            self.blocks.insert(index + 1, leftover);
        }
        allocated
    }

    /// Marks the allocated block at `index` as free and returns it as it was
    /// before release.
    ///
    /// The table may hold adjacent free blocks afterwards; call
    /// [`coalesce`](Self::coalesce) to restore the invariant.
    pub(crate) fn release(&mut self, index: usize) -> Block {
        let block = &mut self.blocks[index];
        let released = *block;
        assert!(!released.is_free(), "block at {} is already free", released.start());
        block.mark_free();
        released
    }

    /// Merges every run of adjacent free blocks in a single pass.
    ///
    /// Returns the number of blocks merged away.
    pub(crate) fn coalesce(&mut self) -> usize {
        let before = self.blocks.len();
        let blocks = mem::take(&mut self.blocks);
        for block in blocks {
            match self.blocks.last_mut() {
                Some(last) if last.is_free() && block.is_free() => last.grow(block.size()),
                _ => self.blocks.push(block),
            }
        }
        before - self.blocks.len()
    }

    /// Checks coverage, contiguity, non-empty blocks, the no-adjacent-free
    /// rule and id uniqueness.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.blocks.is_empty() {
            return Err(InvariantViolation::Empty);
        }

        let mut expected = 0;
        let mut prev_free = false;
        let mut ids = HashSet::new();
        for block in &self.blocks {
            if block.start() != expected {
                return Err(InvariantViolation::Discontiguous {
                    expected,
                    actual: block.start(),
                });
            }
            if block.size() == 0 {
                return Err(InvariantViolation::EmptyBlock {
                    start: block.start(),
                });
            }
            match block.id() {
                None if prev_free => {
                    return Err(InvariantViolation::AdjacentFree {
                        start: block.start(),
                    });
                }
                Some(id) if !ids.insert(id) => {
                    return Err(InvariantViolation::DuplicateId { id });
                }
                _ => {}
            }
            prev_free = block.is_free();
            expected = block.end();
        }

        if expected != self.capacity {
            return Err(InvariantViolation::CoverageMismatch {
                end: expected,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a BlockTable {
    type Item = &'a Block;
    type IntoIter = slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> BlockId {
        BlockId::new(raw)
    }

    fn layout(table: &BlockTable) -> Vec<(usize, usize, Option<u64>)> {
        table
            .iter()
            .map(|b| (b.start(), b.size(), b.id().map(BlockId::get)))
            .collect()
    }

    #[test]
    fn test_new_table_is_one_free_block() {
        let table = BlockTable::new(100);
        assert_eq!(layout(&table), [(0, 100, None)]);
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn test_new_rejects_zero_capacity() {
        let _ = BlockTable::new(0);
    }

    #[test]
    fn test_split_with_leftover() {
        let mut table = BlockTable::new(100);
        let block = table.split_allocate(0, 30, id(1));
        assert_eq!(block.range(), 0..30);
        assert_eq!(layout(&table), [(0, 30, Some(1)), (30, 70, None)]);
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn test_split_exact_fit() {
        let mut table = BlockTable::new(10);
        table.split_allocate(0, 10, id(1));
        assert_eq!(layout(&table), [(0, 10, Some(1))]);
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    #[should_panic(expected = "is not free")]
    fn test_split_allocated_block() {
        let mut table = BlockTable::new(10);
        table.split_allocate(0, 5, id(1));
        table.split_allocate(0, 1, id(2));
    }

    #[test]
    fn test_coalesce_merges_runs() {
        let mut table = BlockTable::new(40);
        for (n, size) in [10, 10, 10].into_iter().enumerate() {
            let index = table.len() - 1;
            table.split_allocate(index, size, id(n as u64 + 1));
        }
        assert_eq!(table.len(), 4);

        let index = table.find_allocated(id(2)).unwrap();
        table.release(index);
        assert_eq!(table.coalesce(), 0);

        let index = table.find_allocated(id(3)).unwrap();
        table.release(index);
        assert_eq!(table.coalesce(), 2);
        assert_eq!(layout(&table), [(0, 10, Some(1)), (10, 30, None)]);

        let index = table.find_allocated(id(1)).unwrap();
        table.release(index);
        assert_eq!(table.coalesce(), 1);
        assert_eq!(layout(&table), [(0, 40, None)]);
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn test_candidates_in_address_order() {
        let mut table = BlockTable::new(30);
        table.split_allocate(0, 5, id(1));
        table.split_allocate(1, 5, id(2));
        table.split_allocate(2, 5, id(3));
        let index = table.find_allocated(id(2)).unwrap();
        table.release(index);

        let starts: Vec<_> = table.candidates(5).map(|c| c.block().start()).collect();
        assert_eq!(starts, [5, 15]);
        let starts: Vec<_> = table.candidates(6).map(|c| c.block().start()).collect();
        assert_eq!(starts, [15]);
    }

    #[test]
    fn test_validate_detects_violations() {
        let mut table = BlockTable::new(20);
        table.blocks = vec![Block::free(0, 10), Block::free(10, 10)];
        assert_eq!(
            table.validate(),
            Err(InvariantViolation::AdjacentFree { start: 10 })
        );

        table.blocks = vec![Block::allocated(0, 10, id(1)), Block::free(12, 8)];
        assert_eq!(
            table.validate(),
            Err(InvariantViolation::Discontiguous {
                expected: 10,
                actual: 12
            })
        );

        table.blocks = vec![Block::allocated(0, 10, id(1)), Block::allocated(10, 10, id(1))];
        assert_eq!(
            table.validate(),
            Err(InvariantViolation::DuplicateId { id: id(1) })
        );

        table.blocks = vec![Block::free(0, 15)];
        assert_eq!(
            table.validate(),
            Err(InvariantViolation::CoverageMismatch {
                end: 15,
                capacity: 20
            })
        );

        table.blocks = vec![];
        assert_eq!(table.validate(), Err(InvariantViolation::Empty));
    }
}
