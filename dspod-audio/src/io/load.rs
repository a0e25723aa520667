//! Audio interrupt load measurement.
//!
//! The scheduler samples a free-running cycle counter (the DWT `CYCCNT` on
//! Cortex-M) on entry to and exit from each block interrupt. The time spent
//! inside and the time between entries give the fraction of the CPU the
//! audio path uses.

use core::sync::atomic::{AtomicU32, Ordering};

/// Free-running cycle counter. Wrapping is expected.
pub trait CycleClock {
    fn now(&self) -> u32;
}

/// Clock for builds without load metering. Always reads zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoClock;

impl CycleClock for NoClock {
    fn now(&self) -> u32 {
        0
    }
}

/// Last measured interrupt cost, shared with the foreground.
pub struct LoadMeter {
    active: AtomicU32,
    period: AtomicU32,
    peak_active: AtomicU32,
}

impl LoadMeter {
    pub const fn new() -> Self {
        LoadMeter {
            active: AtomicU32::new(0),
            period: AtomicU32::new(0),
            peak_active: AtomicU32::new(0),
        }
    }

    /// Record one interrupt. `entry` and `exit` are this interrupt's clock
    /// readings, `prev_entry` the previous interrupt's entry.
    pub fn record(&self, prev_entry: u32, entry: u32, exit: u32) {
        let active = exit.wrapping_sub(entry);
        self.active.store(active, Ordering::Relaxed);
        self.period.store(entry.wrapping_sub(prev_entry), Ordering::Relaxed);
        self.peak_active.fetch_max(active, Ordering::Relaxed);
    }

    /// Cycles spent in the last interrupt.
    pub fn active_cycles(&self) -> u32 {
        self.active.load(Ordering::Relaxed)
    }

    /// Cycles between the last two interrupt entries.
    pub fn period_cycles(&self) -> u32 {
        self.period.load(Ordering::Relaxed)
    }

    /// Longest interrupt since the last call, then reset.
    pub fn take_peak(&self) -> u32 {
        self.peak_active.swap(0, Ordering::Relaxed)
    }

    /// Load of the last period in percent, or 0 before two interrupts have
    /// been seen.
    pub fn load_percent(&self) -> u32 {
        let period = self.period_cycles() as u64;
        if period == 0 {
            return 0;
        }
        (self.active_cycles() as u64 * 100 / period) as u32
    }
}

impl Default for LoadMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_period() {
        let meter = LoadMeter::new();
        assert_eq!(meter.load_percent(), 0);
        meter.record(1000, 11_000, 13_500);
        assert_eq!(meter.active_cycles(), 2500);
        assert_eq!(meter.period_cycles(), 10_000);
        assert_eq!(meter.load_percent(), 25);
    }

    #[test]
    fn counter_wrap_is_handled() {
        let meter = LoadMeter::new();
        meter.record(u32::MAX - 99, 100, 150);
        assert_eq!(meter.period_cycles(), 200);
        assert_eq!(meter.active_cycles(), 50);
        assert_eq!(meter.take_peak(), 50);
        assert_eq!(meter.take_peak(), 0);
    }
}
