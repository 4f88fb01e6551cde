//! The periodic tick entry point.
//!
//! [`TickDriver::on_tick`] is meant to be called from the 10 ms timer interrupt.
//! It does only bounded bookkeeping: counting scheduler delays down and
//! deriving the one second time base. Completed seconds are handed to the
//! dispatch context through [`TickSignals`], whose cells are written only by
//! the tick side and drained only by the dispatch side.

use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::scheduler::Scheduler;
use crate::time::TICKS_PER_SECOND;

/// Cells shared between the tick and dispatch contexts.
#[derive(Debug)]
pub struct TickSignals {
    tick_flag: AtomicBool,
    pending_seconds: AtomicU8,
}

impl Default for TickSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSignals {
    /// Creates signals with nothing pending.
    pub const fn new() -> Self {
        Self {
            tick_flag: AtomicBool::new(false),
            pending_seconds: AtomicU8::new(0),
        }
    }

    /// Returns whether a tick happened since the last call, clearing the flag.
    pub fn take_tick_flag(&self) -> bool {
        self.tick_flag.swap(false, Ordering::AcqRel)
    }

    /// Returns the number of seconds completed since the last call and resets it.
    pub fn take_seconds(&self) -> u8 {
        self.pending_seconds.swap(0, Ordering::AcqRel)
    }

    /// Seconds completed but not yet taken.
    pub fn pending_seconds(&self) -> u8 {
        self.pending_seconds.load(Ordering::Acquire)
    }

    fn raise_tick(&self) {
        self.tick_flag.store(true, Ordering::Release);
    }

    fn add_second(&self) {
        // Saturates rather than wrapping if the main loop stalls for minutes.
        let _ = self
            .pending_seconds
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1));
    }
}

/// Tick-side counters, owned by the timer interrupt.
#[derive(Debug, Default)]
pub struct TickDriver {
    sub_second: u32,
    uptime_seconds: u32,
}

impl TickDriver {
    /// Creates a driver at time zero.
    pub const fn new() -> Self {
        Self {
            sub_second: 0,
            uptime_seconds: 0,
        }
    }

    /// Handles one tick after the inputs were sampled.
    ///
    /// Returns true if this tick completed a second.
    pub fn on_tick<T: Copy, const N: usize>(
        &mut self,
        scheduler: &Scheduler<T, N>,
        signals: &TickSignals,
    ) -> bool {
        signals.raise_tick();
        scheduler.advance();

        self.sub_second += 1;
        if self.sub_second < TICKS_PER_SECOND {
            return false;
        }

        self.sub_second = 0;
        self.uptime_seconds = self.uptime_seconds.wrapping_add(1);
        signals.add_second();
        true
    }

    /// Whole seconds since start.
    pub fn uptime_seconds(&self) -> u32 {
        self.uptime_seconds
    }

    /// Ticks into the current second.
    pub fn sub_second_ticks(&self) -> u32 {
        self.sub_second
    }
}
