//! Ready queue
//!
//! FIFO of processes waiting for the CPU. Entries are appended at the
//! back and taken from the front; nothing is ever removed from the
//! middle. The queue never holds the same process twice, but it does not
//! police that itself: callers check [`ReadyQueue::contains`] first.

use crate::error::ReadyQueueError;
use core_types::ProcessId;
use std::collections::VecDeque;

/// Duplicate-free FIFO of ready processes
#[derive(Debug, Clone, Default)]
pub struct ReadyQueue {
    entries: VecDeque<ProcessId>,
    capacity_limit: Option<usize>,
}

impl ReadyQueue {
    /// Creates an empty, unbounded queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty queue holding at most `limit` entries
    pub fn with_capacity_limit(limit: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity_limit: limit,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity_limit(&self) -> Option<usize> {
        self.capacity_limit
    }

    /// Returns whether the process is already queued
    ///
    /// Linear scan by identity.
    pub fn contains(&self, pid: ProcessId) -> bool {
        self.entries.iter().any(|&queued| queued == pid)
    }

    /// Appends a process at the tail
    ///
    /// The caller must have checked `!contains(pid)`. Storage is reserved
    /// before the queue is touched, so on error nothing changes.
    pub fn enqueue(&mut self, pid: ProcessId) -> Result<(), ReadyQueueError> {
        debug_assert!(!self.contains(pid), "{} is already queued", pid);

        if let Some(limit) = self.capacity_limit {
            if self.entries.len() >= limit {
                return Err(ReadyQueueError::CapacityExceeded { limit });
            }
        }
        self.entries.try_reserve(1)?;
        self.entries.push_back(pid);
        Ok(())
    }

    /// Removes and returns the process at the head
    pub fn dequeue(&mut self) -> Option<ProcessId> {
        self.entries.pop_front()
    }

    /// Returns the process at the head without removing it
    pub fn peek(&self) -> Option<ProcessId> {
        self.entries.front().copied()
    }

    /// Iterates from head to tail
    pub fn iter(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.entries.iter().copied()
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
