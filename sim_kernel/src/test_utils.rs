//! Test utilities for scheduling tests
//!
//! This module provides helper functions and a recording host for writing
//! scheduler and kernel tests.

use crate::fault_injection::FaultPlan;
use crate::{KernelConfig, KernelError, SimulatedKernel};
use core_types::{ProcessId, ProcessRecord};
use cpu_scheduler::SchedulerConfig;
use hal::{IntervalTimer, Pager, PagingError, TimerDevice};
use std::collections::HashSet;

/// A call made by the scheduler into its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    PollTicks(u64),
    Arm { quantum_ticks: u64, at: u64 },
    Prefetch(ProcessId),
}

/// Manually clocked host that records every call
///
/// Lets tests drive a [`cpu_scheduler::Scheduler`] directly, without a
/// kernel, and check exactly what it asked of the machine.
#[derive(Debug, Default)]
pub struct RecordingHost {
    ticks: u64,
    /// Ticks the clock moves during each successful prefetch
    prefetch_cost: u64,
    failing: HashSet<ProcessId>,
    calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every prefetch advance the clock by `ticks`
    pub fn with_prefetch_cost(mut self, ticks: u64) -> Self {
        self.prefetch_cost = ticks;
        self
    }

    /// Makes prefetch fail for `pid` until [`Self::clear_failures`]
    pub fn fail_prefetch_for(&mut self, pid: ProcessId) {
        self.failing.insert(pid);
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    pub fn advance(&mut self, ticks: u64) {
        self.ticks = self.ticks.saturating_add(ticks);
    }

    pub fn now(&self) -> u64 {
        self.ticks
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Quanta the timer was armed with, in order
    pub fn armed(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Arm { quantum_ticks, .. } => Some(*quantum_ticks),
                _ => None,
            })
            .collect()
    }

    /// Processes prefetched, in order
    pub fn prefetched(&self) -> Vec<ProcessId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Prefetch(pid) => Some(*pid),
                _ => None,
            })
            .collect()
    }
}

impl TimerDevice for RecordingHost {
    fn poll_ticks(&mut self) -> u64 {
        self.calls.push(HostCall::PollTicks(self.ticks));
        self.ticks
    }
}

impl IntervalTimer for RecordingHost {
    fn arm(&mut self, quantum_ticks: u64) {
        self.calls.push(HostCall::Arm {
            quantum_ticks,
            at: self.ticks,
        });
    }
}

impl Pager for RecordingHost {
    fn prefetch(&mut self, process: &ProcessRecord) -> Result<(), PagingError> {
        self.calls.push(HostCall::Prefetch(process.id));
        if self.failing.contains(&process.id) {
            return Err(PagingError::Injected(process.id));
        }
        self.advance(self.prefetch_cost);
        Ok(())
    }

    fn startup_cost(&self, _process: &ProcessRecord) -> u64 {
        self.prefetch_cost
    }
}

/// Creates and boots a kernel with the given quantum
pub fn booted_kernel(quantum: u64) -> Result<SimulatedKernel, KernelError> {
    let mut kernel = SimulatedKernel::with_config(KernelConfig {
        scheduler: SchedulerConfig::with_quantum(quantum),
        ..KernelConfig::default()
    });
    kernel.boot()?;
    Ok(kernel)
}

/// Runs a test with a fault plan applied
///
/// Creates and boots a kernel with the given fault plan and passes it to
/// the test closure. Boot errors are returned instead of running `f`.
///
/// # Example
///
/// ```
/// use sim_kernel::test_utils::with_fault_plan;
/// use sim_kernel::fault_injection::{FaultPlan, PagingFault};
///
/// with_fault_plan(
///     FaultPlan::new().with_paging_fault(PagingFault::FailNextPrefetch { count: 1 }),
///     |kernel| {
///         let pid = kernel.create_process(512, 0).unwrap();
///         assert_eq!(kernel.halted(), Some(pid));
///     }
/// )
/// .unwrap();
/// ```
pub fn with_fault_plan<F>(plan: FaultPlan, f: F) -> Result<(), KernelError>
where
    F: FnOnce(&mut SimulatedKernel),
{
    let mut kernel = SimulatedKernel::new().with_fault_plan(plan);
    kernel.boot()?;
    f(&mut kernel);
    Ok(())
}

/// Advances time by `count` whole quanta of the current length
pub fn advance_quanta(kernel: &mut SimulatedKernel, count: u64) -> Result<(), KernelError> {
    for _ in 0..count {
        let quantum = kernel.scheduler().quantum();
        kernel.advance_time(quantum)?;
    }
    Ok(())
}
