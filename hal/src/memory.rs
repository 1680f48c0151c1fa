//! Paging abstraction
//!
//! The scheduler asks the pager to get a process's pages resident right
//! before the process runs ("prepage"). How that happens is up to the
//! implementation.

use core_types::{PageTableId, ProcessId, ProcessRecord};
use thiserror::Error;

/// Errors that can occur while preparing memory for a process
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PagingError {
    /// No page table is registered under this handle
    #[error("Unknown page table: {0}")]
    UnknownPageTable(PageTableId),

    /// Not enough free frames to make the process resident
    #[error("Out of frames: {needed} needed, {available} available")]
    OutOfFrames { needed: usize, available: usize },

    /// Process does not fit in a page table
    #[error("Process of {size_bytes} bytes exceeds the page table")]
    ProcessTooLarge { size_bytes: u64 },

    /// Failure injected by a test fault plan
    #[error("Injected prefetch failure for {0}")]
    Injected(ProcessId),
}

/// Memory-readiness operations consumed by the scheduler
pub trait Pager {
    /// Prepares the mappings of a process that is about to run
    ///
    /// Called synchronously during dispatch. There is no retry: an error
    /// here is fatal for the dispatch that triggered it.
    fn prefetch(&mut self, process: &ProcessRecord) -> Result<(), PagingError>;

    /// Estimated cost, in ticks, of starting the process right now
    fn startup_cost(&self, process: &ProcessRecord) -> u64;
}
