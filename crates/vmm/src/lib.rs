//! # Virtual Memory Manager simulator (VMM)
//!
//! The VMM crate simulates a demand-paged virtual memory system for a single flat address
//! space. It provides:
//!
//! - A two-level page table with lazily allocated second-level tables.
//! - A coremap describing a fixed pool of simulated physical frames.
//! - Four interchangeable page replacement policies: FIFO, exact LRU, Clock and OPT.
//! - A translator that handles faults, eviction and swap traffic while keeping hit, miss
//!   and eviction counters.
//!
//! Trace parsing, option handling and report printing live in the `vmsim` binary.

mod access;
mod address;
mod coremap;
mod layout;
mod numbers;
mod page_directory;
mod page_table;
mod policy;
mod simulator;
mod stats;
mod swap;

pub use access::{AccessKind, ParseAccessError};
pub use address::{PhysicalAddress, VirtualAddress};
pub use coremap::{Coremap, FrameDescriptor, FrameOwner};
pub use layout::{
    PAGE_SHIFT, PAGE_SIZE, PGDIR_SHIFT, PTRS_PER_PGDIR, PTRS_PER_PGTBL, SIM_PAGE_SIZE,
};
pub use numbers::{FrameNumber, PageNumber, SwapOffset};
pub use page_directory::{PageDirectory, PteHandle};
pub use page_table::{PageState, PageTable, PageTableEntry};
pub use policy::{Clock, Fifo, Lru, Opt, ParsePolicyError, PolicyKind, ReplacementPolicy};
pub use simulator::{SimConfig, SimError, Simulator};
pub use stats::Statistics;
pub use swap::{MemorySwap, SwapError, SwapStore};
