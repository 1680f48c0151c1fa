//! Scheduling Test Utilities
//!
//! This crate provides shared utilities for scheduling and integration tests.
//!
//! ## Test Philosophy
//!
//! - **Fairness**: Every ready process reaches the CPU within one round
//! - **Deterministic failures**: All faults are reproducible via FaultPlan
//! - **No lost processes**: A process is always queued, active, waiting or done
//! - **Consistency**: Queue, active mapping and statuses agree after every step

use core_types::{PageTableId, ProcessId, ProcessRecord, ProcessStatus, ProcessTable};
use cpu_scheduler::Scheduler;
use sim_kernel::{KernelError, SimulatedKernel};

/// Creates `count` processes of `size_bytes` each, in order
pub fn spawn_processes(
    kernel: &mut SimulatedKernel,
    count: usize,
    size_bytes: u64,
) -> Result<Vec<ProcessId>, KernelError> {
    (0..count)
        .map(|_| kernel.create_process(size_bytes, 0))
        .collect()
}

/// Inserts `count` fresh `Waiting` records into a bare process table
///
/// For driving a [`Scheduler`] without a kernel.
pub fn seed_table(processes: &mut ProcessTable, count: usize) -> Vec<ProcessId> {
    (0..count)
        .map(|i| {
            let pid = ProcessId::new();
            processes.insert(ProcessRecord::new(pid, PageTableId::new(i as u64 + 1), 512, 0));
            pid
        })
        .collect()
}

/// Checks that scheduler and process table agree
///
/// - at most one process is `Running`, and it is the active one
/// - every queued process is `Ready`
/// - every `Ready` process is queued
/// - no process is queued twice
pub fn check_consistency(scheduler: &Scheduler, processes: &ProcessTable) -> Result<(), String> {
    let running = processes.with_status(ProcessStatus::Running);
    if running.len() > 1 {
        return Err(format!("{} processes running", running.len()));
    }
    if let Some(pid) = running.first() {
        if scheduler.active_process() != Some(*pid) {
            return Err(format!("{} running but not active", pid));
        }
    }

    let queued: Vec<ProcessId> = scheduler.ready_queue().iter().collect();
    for (i, pid) in queued.iter().enumerate() {
        if queued[..i].contains(pid) {
            return Err(format!("{} queued twice", pid));
        }
        match processes.status(*pid) {
            Some(ProcessStatus::Ready) => {}
            other => return Err(format!("{} queued while {:?}", pid, other)),
        }
    }

    for pid in processes.with_status(ProcessStatus::Ready) {
        if !queued.contains(&pid) {
            return Err(format!("{} ready but not queued", pid));
        }
    }
    Ok(())
}

/// Checks a kernel with [`check_consistency`]
pub fn check_kernel(kernel: &SimulatedKernel) -> Result<(), String> {
    check_consistency(kernel.scheduler(), kernel.processes())
}
