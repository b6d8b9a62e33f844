use crate::table::BlockTable;

/// Usage and fragmentation figures of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stats {
    /// Arena capacity.
    pub total_size: usize,
    /// Units held by allocated blocks.
    pub allocated: usize,
    /// Units held by free blocks.
    pub free: usize,
    /// Units wasted inside allocated blocks.
    ///
    /// Always zero: requests are never rounded up.
    pub internal_fragmentation: usize,
    /// Number of free blocks.
    pub external_fragmentation: usize,
    /// Size of the largest free block, i.e. the largest request that can
    /// currently succeed.
    pub largest_free_block: usize,
    /// Number of allocated blocks.
    pub allocated_blocks: usize,
}

impl Stats {
    pub(crate) fn of(table: &BlockTable) -> Self {
        let mut free = 0;
        let mut external_fragmentation = 0;
        let mut largest_free_block = 0;
        let mut allocated_blocks = 0;
        for block in table {
            if block.is_free() {
                free += block.size();
                external_fragmentation += 1;
                largest_free_block = largest_free_block.max(block.size());
            } else {
                allocated_blocks += 1;
            }
        }
        Self {
            total_size: table.capacity(),
            allocated: table.capacity() - free,
            free,
            internal_fragmentation: 0,
            external_fragmentation,
            largest_free_block,
            allocated_blocks,
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockId;

    #[test]
    fn test_stats_of_fresh_table() {
        let stats = Stats::of(&BlockTable::new(64));
        assert_eq!(
            stats,
            Stats {
                total_size: 64,
                allocated: 0,
                free: 64,
                internal_fragmentation: 0,
                external_fragmentation: 1,
                largest_free_block: 64,
                allocated_blocks: 0,
            }
        );
    }

    #[test]
    fn test_stats_of_fragmented_table() {
        let mut table = BlockTable::new(100);
        table.split_allocate(0, 30, BlockId::new(1));
        table.split_allocate(1, 20, BlockId::new(2));
        let index = table.find_allocated(BlockId::new(1)).unwrap();
        table.release(index);

        let stats = Stats::of(&table);
        assert_eq!(stats.allocated, 20);
        assert_eq!(stats.free, 80);
        assert_eq!(stats.allocated + stats.free, stats.total_size);
        assert_eq!(stats.external_fragmentation, 2);
        assert_eq!(stats.largest_free_block, 50);
        assert_eq!(stats.allocated_blocks, 1);
        assert_eq!(stats.internal_fragmentation, 0);
    }
}
