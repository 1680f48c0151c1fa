//! Kernel error types

use core_types::{ProcessId, ProcessStatus};
use cpu_scheduler::SchedulerError;
use hal::PagingError;
use thiserror::Error;

/// Errors that can occur when driving the simulated kernel
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KernelError {
    /// Operation needs a booted kernel
    #[error("Kernel has not been booted")]
    NotBooted,

    /// Boot was called twice
    #[error("Kernel is already booted")]
    AlreadyBooted,

    /// No record for this process
    #[error("Process not found: {0}")]
    ProcessNotFound(ProcessId),

    /// Requested status change is not a valid lifecycle transition
    #[error("Invalid transition for {pid}: {from} -> {to}")]
    InvalidTransition {
        pid: ProcessId,
        from: ProcessStatus,
        to: ProcessStatus,
    },

    /// Dispatch is halted on a failed prefetch; time cannot advance
    #[error("Dispatch halted on {0}")]
    DispatchHalted(ProcessId),

    /// Scheduler refused or failed an operation
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Page table management failed
    #[error("Paging error: {0}")]
    Paging(#[from] PagingError),

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}
