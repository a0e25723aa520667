//! Peak-hold signal level meters.
//!
//! The audio path raises each meter to the largest absolute sample seen;
//! the foreground reads and resets it.

use core::sync::atomic::{AtomicU16, Ordering};

/// Meter index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    InputLeft = 0,
    InputRight = 1,
    OutputLeft = 2,
    OutputRight = 3,
}

pub struct LevelMeters {
    peaks: [AtomicU16; 4],
}

impl LevelMeters {
    #[allow(clippy::declare_interior_mut_const)]
    pub const fn new() -> Self {
        const ZERO: AtomicU16 = AtomicU16::new(0);
        LevelMeters { peaks: [ZERO; 4] }
    }

    /// Track the peaks of an interleaved stereo block. `output` selects the
    /// output pair of meters.
    pub fn update(&self, block: &[i16], output: bool) {
        let mut peak = [0u16; 2];
        for frame in block.chunks_exact(2) {
            peak[0] = peak[0].max(frame[0].unsigned_abs());
            peak[1] = peak[1].max(frame[1].unsigned_abs());
        }
        let base = if output { 2 } else { 0 };
        self.peaks[base].fetch_max(peak[0], Ordering::Relaxed);
        self.peaks[base + 1].fetch_max(peak[1], Ordering::Relaxed);
    }

    /// Return the peak since the last call and reset it.
    pub fn take(&self, level: Level) -> u16 {
        self.peaks[level as usize].swap(0, Ordering::Relaxed)
    }
}

impl Default for LevelMeters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_peak_until_read() {
        let meters = LevelMeters::new();
        meters.update(&[100, -300, -2000, 50], false);
        meters.update(&[10, 10], false);
        assert_eq!(meters.take(Level::InputLeft), 2000);
        assert_eq!(meters.take(Level::InputRight), 300);
        assert_eq!(meters.take(Level::InputLeft), 0);
        assert_eq!(meters.take(Level::OutputLeft), 0);
    }

    #[test]
    fn full_scale_negative_is_measured() {
        let meters = LevelMeters::new();
        meters.update(&[i16::MIN, 0], true);
        assert_eq!(meters.take(Level::OutputLeft), 32768);
    }
}
