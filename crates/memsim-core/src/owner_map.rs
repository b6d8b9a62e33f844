//! Per-unit owner lookup.
//!
//! A cache over the block table: unit `addr` maps to the id of the block
//! covering it, or `None` when that block is free. The engine updates it on
//! every allocation and release.

use core::ops::Range;
use std::collections::TryReserveError;

use crate::{block::BlockId, table::BlockTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OwnerMap {
    owners: Vec<Option<BlockId>>,
}

impl OwnerMap {
    /// Fails if `capacity` entries cannot be allocated.
    pub(crate) fn new(capacity: usize) -> Result<Self, TryReserveError> {
        let mut owners = Vec::new();
        owners.try_reserve_exact(capacity)?;
        owners.resize(capacity, None);
        Ok(Self { owners })
    }

    pub(crate) fn assign(&mut self, range: Range<usize>, owner: Option<BlockId>) {
        self.owners[range].fill(owner);
    }

    pub(crate) fn get(&self, addr: usize) -> Option<Option<BlockId>> {
        self.owners.get(addr).copied()
    }

    /// Returns `true` if every unit agrees with the block covering it.
    pub(crate) fn matches(&self, table: &BlockTable) -> bool {
        self.owners.len() == table.capacity()
            && table
                .iter()
                .all(|block| self.owners[block.range()].iter().all(|o| *o == block.id()))
    }
}
