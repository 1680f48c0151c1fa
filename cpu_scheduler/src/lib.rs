//! # CPU Scheduler
//!
//! Round-robin scheduling policy for the simulated kernel.
//!
//! The scheduler orders and activates processes that already exist. It
//! does not create them, size them or manage their memory: the kernel
//! owns the [`core_types::ProcessTable`] and lends it to every call,
//! and the machine services (clock, quantum timer, pager) come in
//! through [`DispatchHost`].
//!
//! ## Surface
//!
//! - [`Scheduler::initialize`]: arm the timer, empty the ready queue
//! - [`Scheduler::admit`]: put a process in the ready queue
//! - [`Scheduler::dispatch`]: pick and activate the next process
//!
//! ## Example
//!
//! ```
//! use core_types::{PageTableId, ProcessId, ProcessRecord, ProcessTable};
//! use cpu_scheduler::Scheduler;
//! use hal::{IntervalTimer, Pager, PagingError, TimerDevice};
//!
//! struct Machine;
//! impl TimerDevice for Machine {
//!     fn poll_ticks(&mut self) -> u64 { 0 }
//! }
//! impl IntervalTimer for Machine {
//!     fn arm(&mut self, _quantum_ticks: u64) {}
//! }
//! impl Pager for Machine {
//!     fn prefetch(&mut self, _process: &ProcessRecord) -> Result<(), PagingError> { Ok(()) }
//!     fn startup_cost(&self, _process: &ProcessRecord) -> u64 { 0 }
//! }
//!
//! let mut machine = Machine;
//! let mut processes = ProcessTable::new();
//! let pid = ProcessId::new();
//! processes.insert(ProcessRecord::new(pid, PageTableId::new(1), 512, 0));
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.initialize(5, &mut machine).unwrap();
//! scheduler.admit(&mut processes, pid).unwrap();
//! assert_eq!(scheduler.dispatch(&mut processes, &mut machine).unwrap(), Some(pid));
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod ready_queue;
pub mod scheduler;

pub use audit::{ScheduleAuditLog, ScheduleEvent};
pub use config::SchedulerConfig;
pub use error::{ReadyQueueError, SchedulerError};
pub use ready_queue::ReadyQueue;
pub use scheduler::{ActiveMapping, DispatchHost, Scheduler};
