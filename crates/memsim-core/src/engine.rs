//! The allocator engine.
//!
//! [`Engine`] is a two-state machine. It starts uninitialized and every
//! operation other than [`init`](Engine::init) fails with
//! [`ErrorKind::Uninitialized`](crate::ErrorKind::Uninitialized) until the
//! first successful `init`. A later `init` replaces the arena wholesale.
//!
//! Operations validate everything before touching the table, so a failed
//! call never leaves a partial mutation behind.

use core::fmt;

use snafu::{OptionExt as _, ensure};
use tracing::{debug, trace};

use crate::{
    block::{Block, BlockId},
    error::{EngineError, InvalidArgumentSnafu, NoFitSnafu, NotFoundSnafu, UninitializedSnafu},
    owner_map::OwnerMap,
    placement::Placement,
    render::MemoryView,
    stats::Stats,
    table::{BlockRef, BlockTable},
};

/// Result of a successful [`Engine::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Initialized {
    pub capacity: usize,
}

impl fmt::Display for Initialized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory initialized with {} units", self.capacity)
    }
}

/// Result of a successful [`Engine::alloc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub id: BlockId,
    pub start: usize,
    pub size: usize,
    pub placement: Placement,
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block {} allocated ({}): {} units at address {}",
            self.id, self.placement, self.size, self.start
        )
    }
}

/// Result of a successful [`Engine::choose_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub placement: Placement,
    pub requested: usize,
    pub block: Block,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block selected ({}): start={}, size={}",
            self.placement,
            self.block.start(),
            self.block.size()
        )
    }
}

/// Result of a successful [`Engine::free`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freed {
    pub id: BlockId,
    pub start: usize,
    pub size: usize,
}

impl fmt::Display for Freed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {} freed", self.id)
    }
}

#[derive(Debug)]
struct Memory {
    table: BlockTable,
    owners: OwnerMap,
    next_id: BlockId,
}

impl Memory {
    fn new(capacity: usize) -> Result<Self, EngineError> {
        let owners = OwnerMap::new(capacity).ok().context(InvalidArgumentSnafu {
            what: "capacity",
            value: capacity,
            expected: "a size that fits in memory",
        })?;
        Ok(Self {
            table: BlockTable::new(capacity),
            owners,
            next_id: BlockId::FIRST,
        })
    }

    fn search<P>(&self, size: usize, placement: P) -> Result<(Placement, BlockRef), EngineError>
    where
        P: TryInto<Placement>,
        EngineError: From<P::Error>,
    {
        ensure!(
            size > 0,
            InvalidArgumentSnafu {
                what: "size",
                value: size,
                expected: "a positive integer",
            }
        );
        let placement = placement.try_into()?;
        let found = placement
            .choose(&self.table, size)
            .context(NoFitSnafu { size })?;
        trace!(%placement, size, start = found.block().start(), "placement search");
        Ok((placement, found))
    }

    fn check(&self) {
        debug_assert_eq!(self.table.validate(), Ok(()));
        debug_assert!(self.owners.matches(&self.table));
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Uninitialized,
    Initialized(Memory),
}

/// A simulated contiguous-memory allocator.
#[derive(Debug, Default)]
pub struct Engine {
    state: State,
}

impl Engine {
    /// Creates an engine with no arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Initialized(_))
    }

    fn memory(&self) -> Result<&Memory, EngineError> {
        match &self.state {
            State::Uninitialized => UninitializedSnafu.fail(),
            State::Initialized(memory) => Ok(memory),
        }
    }

    fn memory_mut(&mut self) -> Result<&mut Memory, EngineError> {
        match &mut self.state {
            State::Uninitialized => UninitializedSnafu.fail(),
            State::Initialized(memory) => Ok(memory),
        }
    }

    /// Creates a fresh arena of `capacity` units holding one free block.
    ///
    /// Any previous arena and its block ids are discarded. Block ids start
    /// over from 1.
    pub fn init(&mut self, capacity: usize) -> Result<Initialized, EngineError> {
        ensure!(
            capacity > 0,
            InvalidArgumentSnafu {
                what: "capacity",
                value: capacity,
                expected: "a positive integer",
            }
        );
        let memory = Memory::new(capacity)?;
        let replaced = self.is_initialized();
        self.state = State::Initialized(memory);
        debug!(capacity, replaced, "memory initialized");
        Ok(Initialized { capacity })
    }

    /// Allocates `size` units with the given placement strategy.
    ///
    /// `placement` is either a [`Placement`] or a strategy name such as
    /// `"best"`; names are resolved after the size has been checked.
    pub fn alloc<P>(&mut self, size: usize, placement: P) -> Result<Allocation, EngineError>
    where
        P: TryInto<Placement>,
        EngineError: From<P::Error>,
    {
        let memory = self.memory_mut()?;
        let (placement, found) = memory.search(size, placement)?;

        let id = memory.next_id;
        memory.next_id = id.next();
        let block = memory.table.split_allocate(found.index(), size, id);
        memory.owners.assign(block.range(), Some(id));
        memory.check();

        debug!(%id, start = block.start(), size, %placement, "block allocated");
        Ok(Allocation {
            id,
            start: block.start(),
            size,
            placement,
        })
    }

    /// Reports which block [`alloc`](Self::alloc) would use, without
    /// allocating it.
    pub fn choose_block<P>(&self, size: usize, placement: P) -> Result<Choice, EngineError>
    where
        P: TryInto<Placement>,
        EngineError: From<P::Error>,
    {
        let memory = self.memory()?;
        let (placement, found) = memory.search(size, placement)?;
        Ok(Choice {
            placement,
            requested: size,
            block: *found.block(),
        })
    }

    /// Frees the block with the given id and merges adjacent free blocks.
    pub fn free(&mut self, id: BlockId) -> Result<Freed, EngineError> {
        let memory = self.memory_mut()?;
        let index = memory
            .table
            .find_allocated(id)
            .context(NotFoundSnafu { id })?;

        let block = memory.table.release(index);
        memory.owners.assign(block.range(), None);
        let merged = memory.table.coalesce();
        memory.check();

        debug!(%id, start = block.start(), size = block.size(), merged, "block freed");
        Ok(Freed {
            id,
            start: block.start(),
            size: block.size(),
        })
    }

    /// Renders the arena as occupancy and id rows.
    pub fn show(&self) -> Result<MemoryView, EngineError> {
        Ok(MemoryView::of(&self.memory()?.table))
    }

    pub fn stats(&self) -> Result<Stats, EngineError> {
        Ok(Stats::of(&self.memory()?.table))
    }

    /// The block table in address order.
    pub fn blocks(&self) -> Result<&[Block], EngineError> {
        Ok(self.memory()?.table.as_slice())
    }

    pub fn table(&self) -> Result<&BlockTable, EngineError> {
        Ok(&self.memory()?.table)
    }

    pub fn capacity(&self) -> Result<usize, EngineError> {
        Ok(self.memory()?.table.capacity())
    }

    /// Returns the id of the block owning `addr`, or `None` if the unit is
    /// free.
    pub fn owner_of(&self, addr: usize) -> Result<Option<BlockId>, EngineError> {
        let memory = self.memory()?;
        memory.owners.get(addr).with_context(|| InvalidArgumentSnafu {
            what: "address",
            value: addr,
            expected: format!("0..{}", memory.table.capacity()),
        })
    }

    /// Id the next successful allocation will receive.
    pub fn next_id(&self) -> Result<BlockId, EngineError> {
        Ok(self.memory()?.next_id)
    }
}
