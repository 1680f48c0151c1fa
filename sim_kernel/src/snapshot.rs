//! Kernel snapshots
//!
//! A point-in-time view of the scheduling state, for inspection between
//! events. Snapshots are plain data; changing the quantum afterwards goes
//! through [`crate::SimulatedKernel::set_quantum`].

use crate::error::KernelError;
use core_types::{ProcessId, ProcessRecord};
use serde::{Deserialize, Serialize};

/// One process as seen in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    #[serde(flatten)]
    pub record: ProcessRecord,
    /// Ticks it would cost to start the process now
    pub startup_cost: u64,
    pub resident_pages: usize,
}

/// Serializable view of the kernel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSnapshot {
    pub now: u64,
    pub quantum: u64,
    pub active: Option<ProcessId>,
    /// Process the last dispatch halted on
    pub halted: Option<ProcessId>,
    /// Ready queue, head first
    pub ready: Vec<ProcessId>,
    pub free_frames: usize,
    /// All processes in creation order
    pub processes: Vec<ProcessSummary>,
}

impl KernelSnapshot {
    /// Encodes the snapshot as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, KernelError> {
        serde_json::to_string_pretty(self).map_err(|e| KernelError::Snapshot(e.to_string()))
    }

    /// Decodes a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, KernelError> {
        serde_json::from_str(json).map_err(|e| KernelError::Snapshot(e.to_string()))
    }

    /// Looks up one process
    pub fn process(&self, pid: ProcessId) -> Option<&ProcessSummary> {
        self.processes.iter().find(|summary| summary.record.id == pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{PageTableId, ProcessStatus};

    fn sample() -> KernelSnapshot {
        let mut record = ProcessRecord::new(ProcessId::new(), PageTableId::new(1), 600, 0);
        record.status = ProcessStatus::Running;
        let pid = record.id;
        KernelSnapshot {
            now: 15,
            quantum: 5,
            active: Some(pid),
            halted: None,
            ready: Vec::new(),
            free_frames: 62,
            processes: vec![ProcessSummary {
                record,
                startup_cost: 0,
                resident_pages: 2,
            }],
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let snapshot = sample();
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"quantum\": 5"));
        assert!(json.contains("\"status\": \"Running\""));

        let back = KernelSnapshot::from_json(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_invalid_json() {
        let result = KernelSnapshot::from_json("{ not json");
        assert!(matches!(result, Err(KernelError::Snapshot(_))));
    }

    #[test]
    fn test_process_lookup() {
        let snapshot = sample();
        let pid = snapshot.active.unwrap();
        assert_eq!(snapshot.process(pid).map(|s| s.resident_pages), Some(2));
        assert!(snapshot.process(ProcessId::new()).is_none());
    }
}
