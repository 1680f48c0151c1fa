//! Process control records
//!
//! A [`ProcessRecord`] is the per-process state the kernel keeps and the
//! scheduler inspects. Records live in a [`ProcessTable`] owned by the
//! component that creates processes; everyone else holds [`ProcessId`]s.

use crate::ids::{PageTableId, ProcessId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Scheduling status of a process
///
/// Exactly one status holds at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessStatus {
    /// Currently on the CPU
    Running,
    /// Waiting in the ready queue for CPU time
    Ready,
    /// Suspended on an external event
    Waiting,
    /// Finished (terminal)
    Done,
}

impl ProcessStatus {
    /// Returns true for the terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessStatus::Done)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Ready => "ready",
            ProcessStatus::Waiting => "waiting",
            ProcessStatus::Done => "done",
        };
        f.write_str(name)
    }
}

/// Per-process control state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub id: ProcessId,
    pub status: ProcessStatus,
    /// Process size in bytes, assigned at creation
    pub size_bytes: u64,
    /// Simulated time at which the process was created
    pub creation_time: u64,
    /// Simulated time of the most recent dispatch
    pub last_dispatch: u64,
    /// Length of the previous CPU burst in ticks
    pub last_cpu_burst: u64,
    /// Total CPU ticks consumed so far
    pub accumulated_cpu: u64,
    pub page_table: PageTableId,
    /// User-defined priority. Round robin ignores it.
    pub priority: i32,
}

impl ProcessRecord {
    /// Creates a record for a freshly created process
    ///
    /// New processes start out `Waiting`: they are not eligible to run
    /// until someone admits them into the ready queue.
    pub fn new(id: ProcessId, page_table: PageTableId, size_bytes: u64, creation_time: u64) -> Self {
        Self {
            id,
            status: ProcessStatus::Waiting,
            size_bytes,
            creation_time,
            last_dispatch: 0,
            last_cpu_burst: 0,
            accumulated_cpu: 0,
            page_table,
            priority: 0,
        }
    }

    /// Sets the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Records the end of a CPU burst of `burst` ticks
    pub fn record_burst(&mut self, burst: u64) {
        self.last_cpu_burst = burst;
        self.accumulated_cpu = self.accumulated_cpu.saturating_add(burst);
    }
}

/// Table of all process records known to the kernel
///
/// Iteration follows creation order so that reports and snapshots are
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    records: HashMap<ProcessId, ProcessRecord>,
    order: Vec<ProcessId>,
}

impl ProcessTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any record with the same id
    ///
    /// Returns the replaced record, if any.
    pub fn insert(&mut self, record: ProcessRecord) -> Option<ProcessRecord> {
        let id = record.id;
        let previous = self.records.insert(id, record);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    /// Removes a record
    pub fn remove(&mut self, id: ProcessId) -> Option<ProcessRecord> {
        let removed = self.records.remove(&id);
        if removed.is_some() {
            self.order.retain(|&existing| existing != id);
        }
        removed
    }

    pub fn get(&self, id: ProcessId) -> Option<&ProcessRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: ProcessId) -> Option<&mut ProcessRecord> {
        self.records.get_mut(&id)
    }

    pub fn contains(&self, id: ProcessId) -> bool {
        self.records.contains_key(&id)
    }

    /// Returns the status of a process, if it exists
    pub fn status(&self, id: ProcessId) -> Option<ProcessStatus> {
        self.records.get(&id).map(|record| record.status)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over records in creation order
    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Returns the ids of all processes with the given status, in creation order
    pub fn with_status(&self, status: ProcessStatus) -> Vec<ProcessId> {
        self.iter()
            .filter(|record| record.status == status)
            .map(|record| record.id)
            .collect()
    }
}
