//! Scheduler error types

use core_types::ProcessId;
use hal::PagingError;
use std::collections::TryReserveError;
use thiserror::Error;

/// Errors raised while inserting into the ready queue
///
/// Whenever one of these is returned the queue is exactly as it was
/// before the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadyQueueError {
    /// Storage for the new entry could not be allocated
    #[error("Failed to allocate ready queue entry: {0}")]
    AllocationFailed(#[from] TryReserveError),

    /// The configured capacity is already used up
    #[error("Ready queue is full ({limit} entries)")]
    CapacityExceeded { limit: usize },
}

/// Errors returned by scheduler operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// Quantum of zero ticks
    #[error("Quantum must be at least one tick")]
    InvalidQuantum,

    /// The process table has no record for this id
    #[error("Unknown process: {0}")]
    UnknownProcess(ProcessId),

    /// Finished processes never re-enter the ready queue
    #[error("Process already finished: {0}")]
    ProcessFinished(ProcessId),

    /// Admission could not create a queue entry
    #[error("Ready queue error: {0}")]
    Queue(#[from] ReadyQueueError),

    /// The pager could not make the dispatched process resident
    #[error("Prefetch failed for {pid}: {source}")]
    Prefetch {
        pid: ProcessId,
        #[source]
        source: PagingError,
    },
}
