//! Simulated machine
//!
//! Bundles the clock/timer and the pager into the single host object the
//! scheduler dispatches against.

use crate::pager::SimPager;
use crate::timer::SimTimerDevice;
use core_types::ProcessRecord;
use hal::{IntervalTimer, Pager, PagingError, TimerDevice};

/// Clock, quantum timer and pager of the simulated CPU
#[derive(Debug)]
pub struct SimMachine {
    timer: SimTimerDevice,
    pager: SimPager,
}

impl SimMachine {
    pub fn new(timer: SimTimerDevice, pager: SimPager) -> Self {
        Self { timer, pager }
    }

    pub fn timer(&self) -> &SimTimerDevice {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut SimTimerDevice {
        &mut self.timer
    }

    pub fn pager(&self) -> &SimPager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut SimPager {
        &mut self.pager
    }
}

impl TimerDevice for SimMachine {
    fn poll_ticks(&mut self) -> u64 {
        self.timer.poll_ticks()
    }
}

impl IntervalTimer for SimMachine {
    fn arm(&mut self, quantum_ticks: u64) {
        self.timer.arm(quantum_ticks);
    }
}

impl Pager for SimMachine {
    fn prefetch(&mut self, process: &ProcessRecord) -> Result<(), PagingError> {
        self.pager.prefetch(process)
    }

    fn startup_cost(&self, process: &ProcessRecord) -> u64 {
        self.pager.startup_cost(process)
    }
}
