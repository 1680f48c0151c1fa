//! Scheduling audit trail
//!
//! Every decision the scheduler takes is recorded as a [`ScheduleEvent`]
//! so tests can assert on the exact sequence.

use core_types::{ProcessId, ProcessStatus};
use serde::{Deserialize, Serialize};

/// Scheduling event for audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEvent {
    /// Process entered the ready queue
    ProcessAdmitted { pid: ProcessId },
    /// Process was selected to run
    ProcessSelected {
        pid: ProcessId,
        timestamp_ticks: u64,
    },
    /// Still-running process went back to the tail of the queue
    ProcessPreempted {
        pid: ProcessId,
        burst_ticks: u64,
        timestamp_ticks: u64,
    },
    /// Outgoing process had already left the running state
    ProcessReleased {
        pid: ProcessId,
        status: ProcessStatus,
        timestamp_ticks: u64,
    },
    /// Queue entry skipped because its record was gone or no longer ready
    StaleEntryDiscarded {
        pid: ProcessId,
        timestamp_ticks: u64,
    },
    /// Nothing to run
    CpuIdle { timestamp_ticks: u64 },
    /// Pager refused to make the selected process resident
    PrefetchFailed {
        pid: ProcessId,
        timestamp_ticks: u64,
    },
}

/// Ordered record of scheduling events
#[derive(Debug, Clone, Default)]
pub struct ScheduleAuditLog {
    events: Vec<ScheduleEvent>,
}

impl ScheduleAuditLog {
    /// Creates a new empty audit log
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event
    pub fn record(&mut self, event: ScheduleEvent) {
        self.events.push(event);
    }

    /// Returns all recorded events
    pub fn events(&self) -> &[ScheduleEvent] {
        &self.events
    }

    /// Clears all events
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Checks if an event matching the predicate exists
    pub fn has_event<F>(&self, predicate: F) -> bool
    where
        F: Fn(&ScheduleEvent) -> bool,
    {
        self.events.iter().any(predicate)
    }

    /// Counts events matching the predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&ScheduleEvent) -> bool,
    {
        self.events.iter().filter(|e| predicate(e)).count()
    }

    /// Processes in the order they were given the CPU
    pub fn selections(&self) -> Vec<ProcessId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ScheduleEvent::ProcessSelected { pid, .. } => Some(*pid),
                _ => None,
            })
            .collect()
    }
}
