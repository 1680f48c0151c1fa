//! # Core Types
//!
//! This crate defines the fundamental types shared by the scheduler and
//! the simulated kernel.
//!
//! ## Philosophy
//!
//! - **One definition**: A process record is defined here once and owned
//!   by whoever creates processes.
//! - **References by id**: Other components hold [`ProcessId`]s, never
//!   the records themselves.
//!
//! ## Key Types
//!
//! - [`ProcessId`]: Unique identifier for simulated processes
//! - [`PageTableId`]: Opaque handle to a process's memory mapping
//! - [`ProcessRecord`]: Per-process control state
//! - [`ProcessTable`]: The kernel-owned collection of records

pub mod ids;
pub mod process;

pub use ids::{PageTableId, ProcessId};
pub use process::{ProcessRecord, ProcessStatus, ProcessTable};
