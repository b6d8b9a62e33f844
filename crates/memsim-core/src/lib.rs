//! Contiguous memory allocation simulator.
//!
//! This crate models a fixed-size arena of abstract units and an allocator
//! that carves it into blocks. It is meant for studying placement strategies
//! and the fragmentation they cause, not for managing real memory.
//!
//! # Model
//!
//! The arena `[0, capacity)` is partitioned by a [`BlockTable`]: an
//! address-ordered list of [`Block`]s that always covers the whole arena with
//! no gaps and no overlaps. Each block is either free or allocated under a
//! [`BlockId`]. Ids grow monotonically and are never reused.
//!
//! ```text
//! init 100, alloc 30 first, alloc 20 first, free 1, alloc 10 best:
//!
//!  0        10                 30         50                          100
//! ┌─────────┬──────────────────┬──────────┬────────────────────────────┐
//! │ #3      │ free             │ #2       │ free                       │
//! └─────────┴──────────────────┴──────────┴────────────────────────────┘
//! ```
//!
//! - **Allocation** asks a [`Placement`] strategy for a free block, turns its
//!   head into an allocated block and leaves the remainder free.
//! - **Deallocation** marks the block free and coalesces every run of
//!   adjacent free blocks, so no two neighbouring blocks are ever both free.
//!
//! # Placement strategies
//!
//! | Strategy | Picks                            |
//! |----------|----------------------------------|
//! | First-Fit | the lowest-addressed free block that fits |
//! | Best-Fit  | the block leaving the least space behind |
//! | Worst-Fit | the block leaving the most space behind  |
//!
//! Ties are broken by the lowest address.
//!
//! # Usage
//!
//! ```rust
//! use memsim_core::{Engine, ErrorKind, Placement};
//!
//! let mut engine = Engine::new();
//! engine.init(100).unwrap();
//!
//! let a = engine.alloc(30, Placement::FirstFit).unwrap();
//! let b = engine.alloc(20, "first").unwrap();
//! assert_eq!((a.start, b.start), (0, 30));
//!
//! engine.free(a.id).unwrap();
//! let c = engine.alloc(10, "best").unwrap();
//! assert_eq!(c.start, 0);
//!
//! let err = engine.alloc(5, "median").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::UnknownAlgorithm);
//!
//! let stats = engine.stats().unwrap();
//! assert_eq!(stats.allocated + stats.free, stats.total_size);
//! ```
//!
//! # Errors
//!
//! Every operation returns `Result<_, EngineError>`. Match on
//! [`EngineError::kind`] rather than on the message. A failed operation never
//! changes the engine state.
//!
//! # Thread Safety
//!
//! The engine is a plain value with no interior mutability. Sharing it
//! between threads requires one lock held across the whole search and
//! mutation of `alloc` and `free`.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod block;
pub mod engine;
pub mod error;
mod owner_map;
pub mod placement;
pub mod render;
pub mod stats;
pub mod table;

pub use self::{
    block::{Block, BlockId, BlockState},
    engine::{Allocation, Choice, Engine, Freed, Initialized},
    error::{EngineError, ErrorKind},
    placement::Placement,
    render::MemoryView,
    stats::Stats,
    table::{BlockRef, BlockTable, InvariantViolation},
};
