//! Tick-based time keeping.
//!
//! The whole controller runs off one periodic hardware tick. Everything that
//! needs a notion of time (debounce windows, task delays, the one second
//! countdown step) is expressed as a whole number of ticks.

/// Tick period in milliseconds.
pub const TICK_PERIOD_MS: u32 = 10;

/// Number of ticks per elapsed second.
pub const TICKS_PER_SECOND: u32 = 1000 / TICK_PERIOD_MS;

/// A span of time measured in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ticks(pub u32);

impl Ticks {
    /// Zero ticks.
    pub const ZERO: Self = Ticks(0);

    /// Converts milliseconds to ticks, rounding down.
    #[inline]
    pub const fn from_millis(millis: u32) -> Self {
        Ticks(millis / TICK_PERIOD_MS)
    }

    /// Converts whole seconds to ticks.
    #[inline]
    pub const fn from_secs(secs: u32) -> Self {
        Ticks(secs.saturating_mul(TICKS_PER_SECOND))
    }

    /// Returns the span in milliseconds.
    #[inline]
    pub const fn as_millis(&self) -> u32 {
        self.0.saturating_mul(TICK_PERIOD_MS)
    }

    /// Returns the raw tick count.
    #[inline]
    pub const fn count(&self) -> u32 {
        self.0
    }

    /// Saturating subtraction (returns ZERO on underflow).
    #[inline]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Ticks(self.0.saturating_sub(other.0))
    }
}

impl From<u32> for Ticks {
    fn from(ticks: u32) -> Self {
        Ticks(ticks)
    }
}

impl From<Ticks> for u32 {
    fn from(ticks: Ticks) -> Self {
        ticks.0
    }
}
