//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines the machine services the scheduler consumes.
//!
//! ## Philosophy
//!
//! **The scheduler must not know what machine it runs on.**
//!
//! Clock, quantum timer and pager are traits. The simulated kernel
//! implements them for tests and demos; another host could implement
//! them differently without touching scheduling code.
//!
//! ## Design Principles
//!
//! 1. **Trait-based**: All machine operations go through traits
//! 2. **Synchronous**: Every call runs to completion
//! 3. **Testable**: Every trait can be replaced by a recording double

pub mod memory;
pub mod timer;

pub use memory::{Pager, PagingError};
pub use timer::{IntervalTimer, TimerDevice};
