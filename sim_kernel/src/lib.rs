//! # Simulated Kernel
//!
//! This crate drives the round-robin scheduler the way the surrounding
//! operating-system simulator would.
//!
//! ## Purpose
//!
//! The simulated kernel lets scheduling be exercised without hardware:
//! - Runs under `cargo test`
//! - Deterministic (controlled time, no real concurrency)
//! - Inspectable (all state is accessible)
//!
//! ## What the kernel owns
//!
//! - The [`ProcessTable`]: processes are created and retired here
//! - The [`SimMachine`]: clock, quantum timer and pager
//! - The event loop: time advances in [`SimulatedKernel::advance_time`];
//!   when the quantum timer expires the kernel calls dispatch
//!
//! Status changes other than `ready` and `running` (blocking, waking,
//! termination) are made here, then the scheduler is told.
//!
//! ## Halted dispatch
//!
//! A failed prefetch leaves the kernel halted on that process. Operations
//! that already changed state (create, wake, block, terminate) still
//! succeed and the halt is visible through [`SimulatedKernel::halted`].
//! Time does not advance while halted: [`SimulatedKernel::advance_time`]
//! returns [`KernelError::DispatchHalted`] until a dispatch succeeds,
//! either an explicit [`SimulatedKernel::dispatch`] or one triggered by
//! blocking or terminating the halted process.

pub mod error;
pub mod fault_injection;
pub mod machine;
pub mod pager;
pub mod snapshot;
pub mod test_utils;
pub mod timer;

pub use error::KernelError;
pub use machine::SimMachine;
pub use snapshot::{KernelSnapshot, ProcessSummary};

use core_types::{ProcessId, ProcessRecord, ProcessStatus, ProcessTable};
use cpu_scheduler::{Scheduler, SchedulerConfig, SchedulerError};
use fault_injection::{FaultInjector, FaultPlan};
use hal::Pager;
use log::{debug, error, info};
use pager::SimPager;
use serde::{Deserialize, Serialize};
use timer::SimTimerDevice;

/// Kernel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    pub scheduler: SchedulerConfig,
    /// Frames in the simulated physical memory
    pub frame_count: usize,
    /// Bytes per page
    pub page_size: u64,
    /// Ticks charged per page that has to be loaded at startup
    pub page_load_cost: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            frame_count: 64,
            page_size: 512,
            page_load_cost: 2,
        }
    }
}

/// Kernel-side lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelEvent {
    Booted { quantum: u64 },
    ProcessCreated { pid: ProcessId, timestamp_ticks: u64 },
    QuantumExpired {
        active: Option<ProcessId>,
        timestamp_ticks: u64,
    },
    ProcessBlocked { pid: ProcessId, timestamp_ticks: u64 },
    ProcessWoken { pid: ProcessId, timestamp_ticks: u64 },
    ProcessTerminated { pid: ProcessId, timestamp_ticks: u64 },
    QuantumChanged { from: u64, to: u64 },
    /// Dispatch stopped on a prefetch failure
    DispatchHalted { pid: ProcessId, timestamp_ticks: u64 },
}

/// Simulated kernel state
pub struct SimulatedKernel {
    config: KernelConfig,
    processes: ProcessTable,
    scheduler: Scheduler,
    machine: SimMachine,
    booted: bool,
    /// Process whose prefetch failed on the last dispatch
    halted: Option<ProcessId>,
    events: Vec<KernelEvent>,
}

impl SimulatedKernel {
    /// Creates a new simulated kernel with default configuration
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    /// Creates a new simulated kernel with custom configuration
    pub fn with_config(config: KernelConfig) -> Self {
        let pager = SimPager::new(config.frame_count, config.page_size, config.page_load_cost);
        Self {
            scheduler: Scheduler::with_config(config.scheduler.clone()),
            machine: SimMachine::new(SimTimerDevice::new(), pager),
            processes: ProcessTable::new(),
            booted: false,
            halted: None,
            events: Vec::new(),
            config,
        }
    }

    /// Sets the fault plan for the pager
    pub fn with_fault_plan(mut self, plan: FaultPlan) -> Self {
        self.machine
            .pager_mut()
            .set_fault_injector(FaultInjector::new(plan));
        self
    }

    /// Replaces the pager's fault plan
    pub fn set_fault_plan(&mut self, plan: FaultPlan) {
        self.machine
            .pager_mut()
            .set_fault_injector(FaultInjector::new(plan));
    }

    /// Initializes the scheduler and arms the first quantum
    pub fn boot(&mut self) -> Result<(), KernelError> {
        if self.booted {
            return Err(KernelError::AlreadyBooted);
        }
        let quantum = self.config.scheduler.quantum_ticks;
        self.scheduler.initialize(quantum, &mut self.machine)?;
        self.booted = true;
        info!("kernel booted, quantum={}", quantum);
        self.events.push(KernelEvent::Booted { quantum });
        Ok(())
    }

    /// Creates a process and makes it ready
    ///
    /// If the CPU is idle the new process is dispatched right away. The
    /// process exists once this returns `Ok`, even if that dispatch halted.
    pub fn create_process(
        &mut self,
        size_bytes: u64,
        priority: i32,
    ) -> Result<ProcessId, KernelError> {
        self.ensure_booted()?;

        let pid = ProcessId::new();
        let page_table = self
            .machine
            .pager_mut()
            .create_page_table(size_bytes)?;
        let record =
            ProcessRecord::new(pid, page_table, size_bytes, self.now()).with_priority(priority);
        self.processes.insert(record);

        if let Err(err) = self.scheduler.admit(&mut self.processes, pid) {
            self.processes.remove(pid);
            self.machine.pager_mut().release(page_table)?;
            return Err(err.into());
        }

        debug!("created {} ({} bytes)", pid, size_bytes);
        self.events.push(KernelEvent::ProcessCreated {
            pid,
            timestamp_ticks: self.now(),
        });

        if self.scheduler.is_idle() {
            self.dispatch_committed()?;
        }
        Ok(pid)
    }

    /// Advances simulated time, firing quantum expiries on the way
    ///
    /// Refused while dispatch is halted; the clock does not move.
    pub fn advance_time(&mut self, ticks: u64) -> Result<(), KernelError> {
        self.ensure_booted()?;
        if let Some(pid) = self.halted {
            return Err(KernelError::DispatchHalted(pid));
        }
        let target = self.now().saturating_add(ticks);

        loop {
            match self.machine.timer().deadline() {
                Some(deadline) if deadline <= target => {
                    let at = deadline.max(self.now());
                    let timer = self.machine.timer_mut();
                    timer.set_ticks(at);
                    timer.disarm();

                    self.events.push(KernelEvent::QuantumExpired {
                        active: self.scheduler.active_process(),
                        timestamp_ticks: at,
                    });
                    self.dispatch()?;
                }
                _ => {
                    self.machine.timer_mut().set_ticks(target);
                    return Ok(());
                }
            }
        }
    }

    /// Suspends the running process on an external event
    pub fn block_process(&mut self, pid: ProcessId) -> Result<(), KernelError> {
        self.ensure_booted()?;
        self.transition(pid, &[ProcessStatus::Running], ProcessStatus::Waiting)?;

        debug!("blocked {}", pid);
        self.events.push(KernelEvent::ProcessBlocked {
            pid,
            timestamp_ticks: self.now(),
        });

        if self.scheduler.active_process() == Some(pid) {
            self.dispatch_committed()?;
        }
        Ok(())
    }

    /// Completes the event a process was waiting on
    pub fn wake_process(&mut self, pid: ProcessId) -> Result<(), KernelError> {
        self.ensure_booted()?;
        let status = self
            .processes
            .status(pid)
            .ok_or(KernelError::ProcessNotFound(pid))?;
        if status != ProcessStatus::Waiting {
            return Err(KernelError::InvalidTransition {
                pid,
                from: status,
                to: ProcessStatus::Ready,
            });
        }

        self.scheduler.admit(&mut self.processes, pid)?;
        debug!("woke {}", pid);
        self.events.push(KernelEvent::ProcessWoken {
            pid,
            timestamp_ticks: self.now(),
        });

        if self.scheduler.is_idle() {
            self.dispatch_committed()?;
        }
        Ok(())
    }

    /// Finishes a running or waiting process and frees its frames
    pub fn terminate_process(&mut self, pid: ProcessId) -> Result<(), KernelError> {
        self.ensure_booted()?;
        let record = self.transition(
            pid,
            &[ProcessStatus::Running, ProcessStatus::Waiting],
            ProcessStatus::Done,
        )?;
        let page_table = record.page_table;
        let freed = self.machine.pager_mut().release(page_table)?;

        debug!("terminated {}, {} frame(s) freed", pid, freed);
        self.events.push(KernelEvent::ProcessTerminated {
            pid,
            timestamp_ticks: self.now(),
        });

        if self.scheduler.active_process() == Some(pid) {
            self.dispatch_committed()?;
        }
        Ok(())
    }

    /// Changes the quantum; the next dispatch arms the timer with it
    pub fn set_quantum(&mut self, quantum: u64) -> Result<(), KernelError> {
        let from = self.scheduler.quantum();
        self.scheduler.set_quantum(quantum)?;
        self.events.push(KernelEvent::QuantumChanged { from, to: quantum });
        Ok(())
    }

    /// Runs the scheduler's dispatch against this kernel's state
    ///
    /// Success clears a halt; a prefetch failure sets one.
    pub fn dispatch(&mut self) -> Result<Option<ProcessId>, KernelError> {
        self.ensure_booted()?;
        match self.scheduler.dispatch(&mut self.processes, &mut self.machine) {
            Ok(next) => {
                if let Some(pid) = self.halted.take() {
                    info!("dispatch resumed after halt on {}", pid);
                }
                Ok(next)
            }
            Err(err) => {
                if let SchedulerError::Prefetch { pid, .. } = &err {
                    error!("dispatch halted on {}", pid);
                    self.halted = Some(*pid);
                    self.events.push(KernelEvent::DispatchHalted {
                        pid: *pid,
                        timestamp_ticks: self.now(),
                    });
                }
                Err(err.into())
            }
        }
    }

    /// Dispatch following a state change that has already been made
    ///
    /// A prefetch failure is kept as the halt state instead of failing the
    /// caller's operation.
    fn dispatch_committed(&mut self) -> Result<(), KernelError> {
        match self.dispatch() {
            Ok(_) | Err(KernelError::Scheduler(SchedulerError::Prefetch { .. })) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Returns a serializable view of the current state
    pub fn snapshot(&self) -> KernelSnapshot {
        let pager = self.machine.pager();
        KernelSnapshot {
            now: self.now(),
            quantum: self.scheduler.quantum(),
            active: self.scheduler.active_process(),
            halted: self.halted,
            ready: self.scheduler.ready_queue().iter().collect(),
            free_frames: pager.free_frame_count(),
            processes: self
                .processes
                .iter()
                .map(|record| ProcessSummary {
                    startup_cost: pager.startup_cost(record),
                    resident_pages: pager.resident_pages(record.page_table),
                    record: record.clone(),
                })
                .collect(),
        }
    }

    /// Current simulated time
    pub fn now(&self) -> u64 {
        self.machine.timer().current_ticks()
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Process the last dispatch halted on, if not yet resolved
    pub fn halted(&self) -> Option<ProcessId> {
        self.halted
    }

    /// Process currently on the CPU
    pub fn active_process(&self) -> Option<ProcessId> {
        self.scheduler.active_process()
    }

    pub fn process(&self, pid: ProcessId) -> Option<&ProcessRecord> {
        self.processes.get(pid)
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn machine(&self) -> &SimMachine {
        &self.machine
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Ready queue contents, head first
    pub fn ready_order(&self) -> Vec<ProcessId> {
        self.scheduler.ready_queue().iter().collect()
    }

    /// Returns the kernel event trail
    pub fn events(&self) -> &[KernelEvent] {
        &self.events
    }

    /// Clears the kernel event trail
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn ensure_booted(&self) -> Result<(), KernelError> {
        if self.booted {
            Ok(())
        } else {
            Err(KernelError::NotBooted)
        }
    }

    /// Moves a process to `to` if its current status is in `allowed`
    fn transition(
        &mut self,
        pid: ProcessId,
        allowed: &[ProcessStatus],
        to: ProcessStatus,
    ) -> Result<&ProcessRecord, KernelError> {
        let record = self
            .processes
            .get_mut(pid)
            .ok_or(KernelError::ProcessNotFound(pid))?;
        if !allowed.contains(&record.status) {
            return Err(KernelError::InvalidTransition {
                pid,
                from: record.status,
                to,
            });
        }
        record.status = to;
        Ok(&*record)
    }
}

impl Default for SimulatedKernel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fault_injection::PagingFault;
    use hal::PagingError;

    fn booted(quantum: u64) -> SimulatedKernel {
        let mut kernel = SimulatedKernel::with_config(KernelConfig {
            scheduler: SchedulerConfig::with_quantum(quantum),
            ..KernelConfig::default()
        });
        kernel.boot().unwrap();
        kernel
    }

    #[test]
    fn test_kernel_creation() {
        let kernel = SimulatedKernel::new();
        assert!(!kernel.is_booted());
        assert_eq!(kernel.now(), 0);
        assert_eq!(kernel.active_process(), None);
        assert!(kernel.processes().is_empty());
    }

    #[test]
    fn test_operations_require_boot() {
        let mut kernel = SimulatedKernel::new();
        assert_eq!(kernel.create_process(512, 0), Err(KernelError::NotBooted));
        assert_eq!(kernel.advance_time(1), Err(KernelError::NotBooted));
        assert_eq!(kernel.dispatch(), Err(KernelError::NotBooted));
    }

    #[test]
    fn test_boot_arms_timer_once() {
        let mut kernel = booted(5);
        assert_eq!(kernel.machine().timer().deadline(), Some(5));
        assert_eq!(kernel.machine().timer().arm_count(), 1);
        assert_eq!(kernel.boot(), Err(KernelError::AlreadyBooted));
    }

    #[test]
    fn test_first_process_dispatched_immediately() {
        let mut kernel = booted(5);
        let p = kernel.create_process(1024, 0).unwrap();

        assert_eq!(kernel.active_process(), Some(p));
        assert_eq!(kernel.process(p).unwrap().status, ProcessStatus::Running);
        assert_eq!(kernel.machine().pager().resident_pages(kernel.process(p).unwrap().page_table), 2);
    }

    #[test]
    fn test_second_process_waits_in_queue() {
        let mut kernel = booted(5);
        let p1 = kernel.create_process(512, 0).unwrap();
        let p2 = kernel.create_process(512, 0).unwrap();

        assert_eq!(kernel.active_process(), Some(p1));
        assert_eq!(kernel.ready_order(), vec![p2]);
        assert_eq!(kernel.process(p2).unwrap().status, ProcessStatus::Ready);
    }

    #[test]
    fn test_quantum_expiry_rotates() {
        let mut kernel = booted(5);
        let p1 = kernel.create_process(512, 0).unwrap();
        let p2 = kernel.create_process(512, 0).unwrap();

        kernel.advance_time(5).unwrap();
        assert_eq!(kernel.active_process(), Some(p2));
        assert_eq!(kernel.ready_order(), vec![p1]);

        kernel.advance_time(5).unwrap();
        assert_eq!(kernel.active_process(), Some(p1));
        assert_eq!(kernel.ready_order(), vec![p2]);

        assert_eq!(kernel.process(p1).unwrap().accumulated_cpu, 5);
        assert_eq!(kernel.process(p2).unwrap().accumulated_cpu, 5);
    }

    #[test]
    fn test_advance_time_crosses_several_quanta() {
        let mut kernel = booted(4);
        let p1 = kernel.create_process(512, 0).unwrap();
        let p2 = kernel.create_process(512, 0).unwrap();

        kernel.advance_time(10).unwrap();

        assert_eq!(kernel.now(), 10);
        assert_eq!(kernel.active_process(), Some(p1));
        assert_eq!(kernel.process(p1).unwrap().last_dispatch, 8);
        assert_eq!(kernel.process(p2).unwrap().accumulated_cpu, 4);
        assert_eq!(
            kernel
                .events()
                .iter()
                .filter(|e| matches!(e, KernelEvent::QuantumExpired { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_block_and_wake() {
        let mut kernel = booted(5);
        let p1 = kernel.create_process(512, 0).unwrap();
        let p2 = kernel.create_process(512, 0).unwrap();

        kernel.advance_time(2).unwrap();
        kernel.block_process(p1).unwrap();
        assert_eq!(kernel.process(p1).unwrap().status, ProcessStatus::Waiting);
        assert_eq!(kernel.process(p1).unwrap().last_cpu_burst, 2);
        assert_eq!(kernel.active_process(), Some(p2));
        assert!(kernel.ready_order().is_empty());

        kernel.wake_process(p1).unwrap();
        assert_eq!(kernel.process(p1).unwrap().status, ProcessStatus::Ready);
        assert_eq!(kernel.ready_order(), vec![p1]);
        assert_eq!(kernel.active_process(), Some(p2));
    }

    #[test]
    fn test_wake_on_idle_cpu_dispatches() {
        let mut kernel = booted(5);
        let p = kernel.create_process(512, 0).unwrap();

        kernel.block_process(p).unwrap();
        assert_eq!(kernel.active_process(), None);

        kernel.wake_process(p).unwrap();
        assert_eq!(kernel.active_process(), Some(p));
    }

    #[test]
    fn test_invalid_transitions() {
        let mut kernel = booted(5);
        let p1 = kernel.create_process(512, 0).unwrap();
        let p2 = kernel.create_process(512, 0).unwrap();

        assert_eq!(
            kernel.block_process(p2),
            Err(KernelError::InvalidTransition {
                pid: p2,
                from: ProcessStatus::Ready,
                to: ProcessStatus::Waiting,
            })
        );
        assert_eq!(
            kernel.wake_process(p1),
            Err(KernelError::InvalidTransition {
                pid: p1,
                from: ProcessStatus::Running,
                to: ProcessStatus::Ready,
            })
        );

        let ghost = ProcessId::new();
        assert_eq!(
            kernel.terminate_process(ghost),
            Err(KernelError::ProcessNotFound(ghost))
        );
    }

    #[test]
    fn test_terminate_running_process() {
        let mut kernel = booted(5);
        let p1 = kernel.create_process(1024, 0).unwrap();
        let p2 = kernel.create_process(1024, 0).unwrap();
        let frames_before = kernel.machine().pager().free_frame_count();

        kernel.terminate_process(p1).unwrap();

        assert_eq!(kernel.process(p1).unwrap().status, ProcessStatus::Done);
        assert_eq!(kernel.active_process(), Some(p2));
        assert!(!kernel.ready_order().contains(&p1));
        // p1's frames came back, p2's were taken
        assert_eq!(kernel.machine().pager().free_frame_count(), frames_before);

        assert!(matches!(
            kernel.terminate_process(p1),
            Err(KernelError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_terminate_ready_process_rejected() {
        let mut kernel = booted(5);
        let p1 = kernel.create_process(512, 0).unwrap();
        let p2 = kernel.create_process(512, 0).unwrap();

        assert_eq!(
            kernel.terminate_process(p2),
            Err(KernelError::InvalidTransition {
                pid: p2,
                from: ProcessStatus::Ready,
                to: ProcessStatus::Done,
            })
        );
        assert_eq!(kernel.process(p2).unwrap().status, ProcessStatus::Ready);
        assert_eq!(kernel.ready_order(), vec![p2]);

        kernel.advance_time(5).unwrap();
        assert_eq!(kernel.active_process(), Some(p2));
        assert_eq!(kernel.ready_order(), vec![p1]);
    }

    #[test]
    fn test_terminate_waiting_process() {
        let mut kernel = booted(5);
        let p1 = kernel.create_process(512, 0).unwrap();
        let p2 = kernel.create_process(512, 0).unwrap();

        kernel.block_process(p1).unwrap();
        kernel.terminate_process(p1).unwrap();

        assert_eq!(kernel.process(p1).unwrap().status, ProcessStatus::Done);
        assert_eq!(kernel.active_process(), Some(p2));
        assert!(!kernel.scheduler().is_queued(p1));
        assert_eq!(
            kernel.wake_process(p1),
            Err(KernelError::InvalidTransition {
                pid: p1,
                from: ProcessStatus::Done,
                to: ProcessStatus::Ready,
            })
        );
    }

    #[test]
    fn test_idle_kernel_does_not_rearm() {
        let mut kernel = booted(5);
        kernel.advance_time(20).unwrap();

        assert_eq!(kernel.now(), 20);
        assert_eq!(kernel.active_process(), None);
        assert_eq!(kernel.machine().timer().deadline(), None);
        assert_eq!(kernel.machine().timer().arm_count(), 1);
    }

    #[test]
    fn test_set_quantum_applies_on_next_dispatch() {
        let mut kernel = booted(5);
        let _p1 = kernel.create_process(512, 0).unwrap();
        let _p2 = kernel.create_process(512, 0).unwrap();

        kernel.set_quantum(3).unwrap();
        // Current slice still ends at 5
        assert_eq!(kernel.machine().timer().deadline(), Some(5));
        kernel.advance_time(5).unwrap();
        assert_eq!(kernel.machine().timer().deadline(), Some(8));

        assert!(matches!(
            kernel.set_quantum(0),
            Err(KernelError::Scheduler(SchedulerError::InvalidQuantum))
        ));
    }

    #[test]
    fn test_process_too_large() {
        let mut kernel = booted(5);
        let result = kernel.create_process(1 << 20, 0);
        assert!(matches!(
            result,
            Err(KernelError::Paging(PagingError::ProcessTooLarge { .. }))
        ));
        assert!(kernel.processes().is_empty());
    }

    #[test]
    fn test_admission_failure_rolls_back_creation() {
        let mut kernel = SimulatedKernel::with_config(KernelConfig {
            scheduler: SchedulerConfig {
                ready_capacity: Some(1),
                ..SchedulerConfig::default()
            },
            ..KernelConfig::default()
        });
        kernel.boot().unwrap();
        kernel.create_process(512, 0).unwrap(); // dispatched, queue empty
        kernel.create_process(512, 0).unwrap(); // queued
        let free_before = kernel.machine().pager().free_frame_count();

        let result = kernel.create_process(512, 0);
        assert!(matches!(result, Err(KernelError::Scheduler(SchedulerError::Queue(_)))));
        assert_eq!(kernel.processes().len(), 2);
        assert_eq!(kernel.machine().pager().free_frame_count(), free_before);
    }

    #[test]
    fn test_create_returns_pid_when_dispatch_halts() {
        let mut kernel = SimulatedKernel::new()
            .with_fault_plan(FaultPlan::new().with_paging_fault(PagingFault::FailNextPrefetch { count: 1 }));
        kernel.boot().unwrap();

        let pid = kernel.create_process(512, 0).unwrap();

        assert_eq!(kernel.processes().len(), 1);
        assert_eq!(kernel.active_process(), Some(pid));
        assert_eq!(kernel.process(pid).unwrap().status, ProcessStatus::Running);
        assert_eq!(kernel.halted(), Some(pid));
        assert!(kernel
            .events()
            .iter()
            .any(|e| matches!(e, KernelEvent::DispatchHalted { pid: halted, .. } if *halted == pid)));

        // Retiring the halted process resumes the kernel
        kernel.terminate_process(pid).unwrap();
        assert_eq!(kernel.active_process(), None);
        assert_eq!(kernel.halted(), None);
        kernel.advance_time(1).unwrap();
    }

    #[test]
    fn test_wake_commits_when_dispatch_halts() {
        let mut kernel = booted(5);
        let pid = kernel.create_process(512, 0).unwrap();
        kernel.block_process(pid).unwrap();
        kernel.set_fault_plan(
            FaultPlan::new().with_paging_fault(PagingFault::FailPrefetchFor { pid }),
        );

        kernel.wake_process(pid).unwrap();

        assert_eq!(kernel.halted(), Some(pid));
        assert_eq!(kernel.process(pid).unwrap().status, ProcessStatus::Running);
        assert!(matches!(
            kernel.wake_process(pid),
            Err(KernelError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_advance_time_refused_while_halted() {
        let mut kernel = booted(5);
        let pid = kernel.create_process(512, 0).unwrap();
        kernel.block_process(pid).unwrap();
        kernel.set_fault_plan(
            FaultPlan::new().with_paging_fault(PagingFault::FailNextPrefetch { count: 1 }),
        );
        kernel.wake_process(pid).unwrap();

        assert_eq!(kernel.advance_time(100), Err(KernelError::DispatchHalted(pid)));
        assert_eq!(kernel.now(), 0);

        // The fault was one-shot, so an explicit retry succeeds
        assert_eq!(kernel.dispatch().unwrap(), Some(pid));
        assert_eq!(kernel.halted(), None);
        kernel.advance_time(100).unwrap();
        assert_eq!(kernel.now(), 100);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut kernel = booted(5);
        let p1 = kernel.create_process(1024, 3).unwrap();
        let p2 = kernel.create_process(512, 1).unwrap();
        kernel.advance_time(2).unwrap();

        let snapshot = kernel.snapshot();
        assert_eq!(snapshot.now, 2);
        assert_eq!(snapshot.quantum, 5);
        assert_eq!(snapshot.active, Some(p1));
        assert_eq!(snapshot.halted, None);
        assert_eq!(snapshot.ready, vec![p2]);
        assert_eq!(snapshot.processes.len(), 2);
        assert_eq!(snapshot.process(p1).unwrap().resident_pages, 2);
        assert_eq!(snapshot.process(p1).unwrap().record.priority, 3);
        assert_eq!(snapshot.process(p2).unwrap().startup_cost, 2);
    }
}
