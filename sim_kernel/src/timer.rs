//! # Simulated Timer Device
//!
//! Deterministic clock and quantum timer.
//!
//! ## Philosophy
//!
//! **Determinism enables thorough testing.**
//!
//! Time only moves when the kernel says so. The quantum timer is a single
//! deadline: arming replaces it, and the kernel checks it while advancing
//! time. Nothing fires on its own.

use hal::{IntervalTimer, TimerDevice};

/// Simulated clock with one armable deadline
///
/// # Examples
///
/// ```
/// use sim_kernel::timer::SimTimerDevice;
/// use hal::{IntervalTimer, TimerDevice};
///
/// let mut timer = SimTimerDevice::new();
/// timer.arm(10);
/// timer.advance_ticks(4);
/// assert_eq!(timer.poll_ticks(), 4);
/// assert_eq!(timer.ticks_until_expiry(), Some(6));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimTimerDevice {
    /// Current tick count
    ticks: u64,
    /// Absolute tick at which the armed quantum expires
    deadline: Option<u64>,
    /// Number of times the timer has been armed
    arm_count: u64,
}

impl SimTimerDevice {
    /// Creates a new simulated timer starting at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new simulated timer starting at a specific tick count
    pub fn with_initial_ticks(ticks: u64) -> Self {
        Self {
            ticks,
            ..Self::default()
        }
    }

    /// Advances the clock by the specified number of ticks
    ///
    /// Saturates at `u64::MAX`.
    pub fn advance_ticks(&mut self, delta: u64) {
        self.ticks = self.ticks.saturating_add(delta);
    }

    /// Sets the clock to a specific tick count
    ///
    /// # Panics
    ///
    /// Panics if `new_ticks < self.ticks` (would violate monotonicity).
    pub fn set_ticks(&mut self, new_ticks: u64) {
        assert!(
            new_ticks >= self.ticks,
            "Cannot set ticks backwards: {} < {}",
            new_ticks,
            self.ticks
        );
        self.ticks = new_ticks;
    }

    /// Returns the current tick count without requiring mutable access
    pub fn current_ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns the armed deadline, if any
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Returns true if a deadline is armed and has been reached
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| self.ticks >= deadline)
    }

    /// Ticks left before the armed deadline
    pub fn ticks_until_expiry(&self) -> Option<u64> {
        self.deadline
            .map(|deadline| deadline.saturating_sub(self.ticks))
    }

    /// Cancels the armed deadline
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Returns how many times the timer has been armed
    pub fn arm_count(&self) -> u64 {
        self.arm_count
    }
}

impl TimerDevice for SimTimerDevice {
    fn poll_ticks(&mut self) -> u64 {
        self.ticks
    }
}

impl IntervalTimer for SimTimerDevice {
    fn arm(&mut self, quantum_ticks: u64) {
        self.deadline = Some(self.ticks.saturating_add(quantum_ticks));
        self.arm_count += 1;
    }
}
