//! Deterministic fault injection for testing
//!
//! Lets tests make the simulated pager refuse prefetches, so the fatal
//! prefetch path of dispatch can be exercised.
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: No randomness
//! - **Composable**: Several faults can be combined in one plan
//! - **Test-focused**: Not intended for production use
//!
//! ## Example
//!
//! ```
//! use sim_kernel::fault_injection::{FaultPlan, PagingFault};
//!
//! let plan = FaultPlan::new().with_paging_fault(PagingFault::FailNextPrefetch { count: 2 });
//! assert_eq!(plan.paging_faults().len(), 1);
//! ```

use core_types::ProcessId;
use std::collections::HashSet;

/// A fault to inject into page prefetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingFault {
    /// Fail the next N prefetches, whatever the process
    FailNextPrefetch { count: usize },

    /// Fail every prefetch for one process
    FailPrefetchFor { pid: ProcessId },
}

/// A plan describing all faults to inject
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    paging_faults: Vec<PagingFault>,
}

impl FaultPlan {
    /// Creates a new empty fault plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a paging fault to the plan
    pub fn with_paging_fault(mut self, fault: PagingFault) -> Self {
        self.paging_faults.push(fault);
        self
    }

    /// Returns a reference to the paging faults
    pub fn paging_faults(&self) -> &[PagingFault] {
        &self.paging_faults
    }
}

/// Stateful view of a [`FaultPlan`]
#[derive(Debug)]
pub struct FaultInjector {
    fail_next_remaining: usize,
    fail_for: HashSet<ProcessId>,
    injected: usize,
}

impl FaultInjector {
    /// Creates a new fault injector with the given plan
    pub fn new(plan: FaultPlan) -> Self {
        let mut injector = Self {
            fail_next_remaining: 0,
            fail_for: HashSet::new(),
            injected: 0,
        };

        for fault in plan.paging_faults {
            match fault {
                PagingFault::FailNextPrefetch { count } => {
                    injector.fail_next_remaining += count;
                }
                PagingFault::FailPrefetchFor { pid } => {
                    injector.fail_for.insert(pid);
                }
            }
        }

        injector
    }

    /// Decides whether the prefetch for `pid` should fail
    ///
    /// Consumes one `FailNextPrefetch` credit when it fires.
    pub fn should_fail_prefetch(&mut self, pid: ProcessId) -> bool {
        let fail = if self.fail_for.contains(&pid) {
            true
        } else if self.fail_next_remaining > 0 {
            self.fail_next_remaining -= 1;
            true
        } else {
            false
        };

        if fail {
            self.injected += 1;
        }
        fail
    }

    /// Number of failures injected so far
    pub fn injected_count(&self) -> usize {
        self.injected
    }
}
