//! Scheduler configuration

use serde::{Deserialize, Serialize};

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of ticks a process runs before the timer forces a dispatch
    pub quantum_ticks: u64,
    /// Upper bound on ready queue length (None = limited only by memory)
    pub ready_capacity: Option<usize>,
    /// Whether scheduling decisions are recorded in the audit log
    pub audit_enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quantum_ticks: 10, // Small quantum for testing
            ready_capacity: None,
            audit_enabled: true,
        }
    }
}

impl SchedulerConfig {
    /// Default configuration with a specific quantum
    pub fn with_quantum(quantum_ticks: u64) -> Self {
        Self {
            quantum_ticks,
            ..Self::default()
        }
    }
}
