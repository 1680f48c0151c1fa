//! Round-Robin CPU Scheduler
//!
//! This module decides which simulated process runs next.
//!
//! ## Philosophy
//!
//! - **Context, not globals**: The active mapping and the quantum are
//!   fields of [`Scheduler`]. The kernel passes its process table and its
//!   machine services into every call.
//! - **Determinism first**: Same admissions + same dispatches => same
//!   schedule. Strict FIFO, no tie-breaking by priority or history.
//! - **Run to completion**: Every operation finishes before returning.
//!
//! ## Dispatch
//!
//! On every scheduling event (quantum expiry, block, exit) the kernel
//! calls [`Scheduler::dispatch`]:
//!
//! 1. The outgoing process is accounted. If it is still `Running` it goes
//!    back to the tail of the queue; otherwise the kernel already moved it
//!    elsewhere and the scheduler lets it go.
//! 2. The head of the queue becomes `Running` and the active mapping.
//! 3. Its pages are prefetched, its dispatch time is stamped and the
//!    timer is armed for one quantum.
//! 4. With nothing to run, the active mapping is cleared. The timer is
//!    left alone while idle.
//!
//! The outgoing process is always re-queued (or released) before the next
//! one is popped, so it is never untracked.

use crate::audit::{ScheduleAuditLog, ScheduleEvent};
use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::ready_queue::ReadyQueue;
use core_types::{PageTableId, ProcessId, ProcessStatus, ProcessTable};
use hal::{IntervalTimer, Pager, TimerDevice};
use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};

/// Machine services needed by [`Scheduler::dispatch`]
pub trait DispatchHost: TimerDevice + IntervalTimer + Pager {}

impl<T> DispatchHost for T where T: TimerDevice + IntervalTimer + Pager + ?Sized {}

/// The process whose mapping is currently live on the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMapping {
    pub pid: ProcessId,
    pub page_table: PageTableId,
    /// Clock value stamped once the dispatch completed; `None` if the
    /// prefetch for this process failed
    pub dispatched_at: Option<u64>,
}

/// Round-robin scheduler
pub struct Scheduler {
    config: SchedulerConfig,
    quantum: u64,
    ready: ReadyQueue,
    active: Option<ActiveMapping>,
    /// Audit log for scheduling events
    audit_log: ScheduleAuditLog,
}

impl Scheduler {
    /// Creates a new scheduler with default configuration
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Creates a new scheduler with custom configuration
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            quantum: config.quantum_ticks,
            ready: ReadyQueue::with_capacity_limit(config.ready_capacity),
            active: None,
            audit_log: ScheduleAuditLog::new(),
            config,
        }
    }

    /// Arms the timer for `quantum` and empties the ready queue
    ///
    /// Meant to be called once before the first dispatch. Calling it again
    /// drops whatever was queued. The active mapping is not touched.
    pub fn initialize<T>(&mut self, quantum: u64, timer: &mut T) -> Result<(), SchedulerError>
    where
        T: IntervalTimer + ?Sized,
    {
        if quantum == 0 {
            return Err(SchedulerError::InvalidQuantum);
        }
        self.quantum = quantum;
        timer.arm(quantum);
        if !self.ready.is_empty() {
            warn!(
                "scheduler re-initialized with {} queued processes",
                self.ready.len()
            );
        }
        self.ready.clear();
        debug!("scheduler initialized, quantum={}", quantum);
        Ok(())
    }

    /// Makes a process eligible to run
    ///
    /// Already-queued processes are left where they are. Returns whether
    /// the process was newly queued. If the queue cannot take the entry
    /// the record keeps its previous status.
    pub fn admit(
        &mut self,
        processes: &mut ProcessTable,
        pid: ProcessId,
    ) -> Result<bool, SchedulerError> {
        let record = processes
            .get_mut(pid)
            .ok_or(SchedulerError::UnknownProcess(pid))?;

        if self.ready.contains(pid) {
            trace!("{} already queued", pid);
            return Ok(false);
        }
        if record.status.is_terminal() {
            return Err(SchedulerError::ProcessFinished(pid));
        }

        self.ready.enqueue(pid)?;
        record.status = ProcessStatus::Ready;

        trace!("{} admitted, {} ready", pid, self.ready.len());
        self.record(ScheduleEvent::ProcessAdmitted { pid });
        Ok(true)
    }

    /// Selects and activates the next process
    ///
    /// Returns the newly active process, or `None` if the CPU went idle.
    ///
    /// A prefetch failure is returned as [`SchedulerError::Prefetch`]. The
    /// failing process stays active and `Running`, and the timer is not
    /// armed, so nothing moves until the kernel intervenes.
    pub fn dispatch<H>(
        &mut self,
        processes: &mut ProcessTable,
        host: &mut H,
    ) -> Result<Option<ProcessId>, SchedulerError>
    where
        H: DispatchHost + ?Sized,
    {
        let now = host.poll_ticks();
        self.release_active(processes, now)?;

        loop {
            let Some(pid) = self.ready.dequeue() else {
                debug!("cpu idle at tick {}", now);
                self.record(ScheduleEvent::CpuIdle {
                    timestamp_ticks: now,
                });
                return Ok(None);
            };

            let Some(record) = processes.get_mut(pid) else {
                warn!("{} was queued but has no record; skipping", pid);
                self.record(ScheduleEvent::StaleEntryDiscarded {
                    pid,
                    timestamp_ticks: now,
                });
                continue;
            };
            if record.status != ProcessStatus::Ready {
                warn!("{} was queued while {}; skipping", pid, record.status);
                self.record(ScheduleEvent::StaleEntryDiscarded {
                    pid,
                    timestamp_ticks: now,
                });
                continue;
            }

            record.status = ProcessStatus::Running;
            self.active = Some(ActiveMapping {
                pid,
                page_table: record.page_table,
                dispatched_at: None,
            });

            if let Err(source) = host.prefetch(record) {
                error!("prefetch failed for {}: {}", pid, source);
                self.record(ScheduleEvent::PrefetchFailed {
                    pid,
                    timestamp_ticks: now,
                });
                return Err(SchedulerError::Prefetch { pid, source });
            }

            let stamp = host.poll_ticks();
            record.last_dispatch = stamp;
            if let Some(active) = self.active.as_mut() {
                active.dispatched_at = Some(stamp);
            }
            host.arm(self.quantum);

            debug!("dispatched {} at tick {}", pid, stamp);
            self.record(ScheduleEvent::ProcessSelected {
                pid,
                timestamp_ticks: stamp,
            });
            return Ok(Some(pid));
        }
    }

    /// Changes the quantum used by the next arm of the timer
    pub fn set_quantum(&mut self, quantum: u64) -> Result<(), SchedulerError> {
        if quantum == 0 {
            return Err(SchedulerError::InvalidQuantum);
        }
        debug!("quantum {} -> {}", self.quantum, quantum);
        self.quantum = quantum;
        Ok(())
    }

    /// Returns the current quantum in ticks
    pub fn quantum(&self) -> u64 {
        self.quantum
    }

    /// Returns the active mapping, if a process is on the CPU
    pub fn active(&self) -> Option<&ActiveMapping> {
        self.active.as_ref()
    }

    /// Returns the process currently on the CPU
    pub fn active_process(&self) -> Option<ProcessId> {
        self.active.map(|mapping| mapping.pid)
    }

    /// Returns true if nothing is on the CPU
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Returns the ready queue
    pub fn ready_queue(&self) -> &ReadyQueue {
        &self.ready
    }

    /// Returns the number of queued processes
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Returns whether the process is waiting in the ready queue
    pub fn is_queued(&self, pid: ProcessId) -> bool {
        self.ready.contains(pid)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Returns a reference to the audit log
    ///
    /// Used in tests to verify scheduling behavior.
    pub fn audit_log(&self) -> &ScheduleAuditLog {
        &self.audit_log
    }

    /// Clears the audit log
    pub fn clear_audit_log(&mut self) {
        self.audit_log.clear();
    }

    /// Takes the outgoing process off the CPU
    ///
    /// A still-running process is re-admitted. If that fails the active
    /// mapping is kept so the process is not lost.
    fn release_active(
        &mut self,
        processes: &mut ProcessTable,
        now: u64,
    ) -> Result<(), SchedulerError> {
        let Some(outgoing) = self.active else {
            return Ok(());
        };
        let pid = outgoing.pid;

        let Some(status) = processes.status(pid) else {
            warn!("active {} has no record", pid);
            self.active = None;
            return Ok(());
        };

        if status == ProcessStatus::Running {
            self.admit(processes, pid)?;
        }

        let burst = outgoing
            .dispatched_at
            .map(|at| now.saturating_sub(at))
            .unwrap_or(0);
        if let Some(record) = processes.get_mut(pid) {
            if outgoing.dispatched_at.is_some() {
                record.record_burst(burst);
            }
        }
        self.active = None;

        let event = if status == ProcessStatus::Running {
            trace!("{} preempted after {} ticks", pid, burst);
            ScheduleEvent::ProcessPreempted {
                pid,
                burst_ticks: burst,
                timestamp_ticks: now,
            }
        } else {
            trace!("{} released while {}", pid, status);
            ScheduleEvent::ProcessReleased {
                pid,
                status,
                timestamp_ticks: now,
            }
        };
        self.record(event);
        Ok(())
    }

    fn record(&mut self, event: ScheduleEvent) {
        if self.config.audit_enabled {
            self.audit_log.record(event);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
