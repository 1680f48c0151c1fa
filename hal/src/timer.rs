//! # Timer Devices
//!
//! Hardware abstraction for simulated time.
//!
//! ## Philosophy
//!
//! **Time is a service, not a global variable.**
//!
//! Two separate capabilities live here:
//! - [`TimerDevice`]: a monotonic tick counter (the simulated clock)
//! - [`IntervalTimer`]: a one-shot quantum timer that the kernel turns
//!   into a scheduling event when it expires
//!
//! Neither trait blocks or sleeps, and neither implements scheduling.
//!
//! ## Design Principles
//!
//! 1. **Monotonic**: Ticks never go backwards
//! 2. **Non-blocking**: Always returns immediately
//! 3. **Cumulative**: Returns total ticks since boot
//! 4. **Frequency-agnostic**: No assumptions about tick rate at this layer

/// Monotonic clock
///
/// # Implementation Notes
///
/// - Must be monotonic (never return a smaller value)
/// - Must not block
/// - Tick frequency is implementation-defined
///
/// # Examples
///
/// ```
/// use hal::TimerDevice;
///
/// fn measure_operation<T: TimerDevice>(timer: &mut T) -> u64 {
///     let start = timer.poll_ticks();
///     // ... do work ...
///     let end = timer.poll_ticks();
///     end - start
/// }
/// ```
pub trait TimerDevice {
    /// Returns the current tick count
    fn poll_ticks(&mut self) -> u64;
}

/// One-shot quantum timer
///
/// Arming replaces any previously armed deadline. When the deadline is
/// reached the owner of the timer raises a scheduling event; the timer
/// itself never calls back into anyone.
pub trait IntervalTimer {
    /// (Re)starts the timer so that it expires `quantum_ticks` from now
    fn arm(&mut self, quantum_ticks: u64);
}
