//! Analog control inputs.
//!
//! The pedal has four 12-bit controls (three parameter knobs/CVs and the
//! wet/dry knob). The ADC interrupt feeds raw conversions into a
//! [`ControlBank`]; the audio path takes one [`ControlFrame`] snapshot per
//! block through the [`ControlSource`] trait.

use core::sync::atomic::{AtomicI32, AtomicU16, Ordering};

use crate::constants::{CONTROL_CHANNELS, CONTROL_FULL_SCALE};
use crate::dsp::unsigned_saturate12;

/// Smoothing shift of the one-pole control filter.
const IIR_COEF: u32 = 6;

/// One block's worth of control values, each `0..=4095`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlFrame(pub [u16; CONTROL_CHANNELS]);

impl ControlFrame {
    /// Frame with every control at `value`.
    pub const fn splat(value: u16) -> Self {
        ControlFrame([value; CONTROL_CHANNELS])
    }

    /// Value of control `ch`, or 0 for an out-of-range channel.
    pub fn get(&self, ch: usize) -> u16 {
        self.0.get(ch).copied().unwrap_or(0)
    }
}

/// Supplies the current control values to the audio path.
pub trait ControlSource {
    /// Sample all controls. Called once per block from interrupt context.
    fn snapshot(&self) -> ControlFrame;
}

impl<T: ControlSource + ?Sized> ControlSource for &T {
    fn snapshot(&self) -> ControlFrame {
        (**self).snapshot()
    }
}

impl ControlSource for ControlFrame {
    fn snapshot(&self) -> ControlFrame {
        *self
    }
}

/// Lock-free control store shared between the ADC interrupt and the audio path.
///
/// Each channel runs a one-pole low-pass:
/// `iir += ((raw << 6) - iir) >> 6`, published value `iir >> 6`.
/// Panels wired so that clockwise reads low set `invert`, which flips the raw
/// conversion (`raw ^ 0xfff`) before filtering.
pub struct ControlBank {
    values: [AtomicU16; CONTROL_CHANNELS],
    iir: [AtomicI32; CONTROL_CHANNELS],
    invert: bool,
}

impl ControlBank {
    #[allow(clippy::declare_interior_mut_const)]
    pub const fn new(invert: bool) -> Self {
        const ZERO_VALUE: AtomicU16 = AtomicU16::new(0);
        const ZERO_IIR: AtomicI32 = AtomicI32::new(0);
        ControlBank {
            values: [ZERO_VALUE; CONTROL_CHANNELS],
            iir: [ZERO_IIR; CONTROL_CHANNELS],
            invert,
        }
    }

    /// Feed one raw 12-bit conversion for channel `ch`.
    ///
    /// Only the ADC interrupt calls this, so the filter state has a single
    /// writer and relaxed ordering is sufficient.
    pub fn feed(&self, ch: usize, raw: u16) {
        if ch >= CONTROL_CHANNELS {
            return;
        }
        let mut raw = unsigned_saturate12(raw as i32) as i32;
        if self.invert {
            raw ^= CONTROL_FULL_SCALE as i32;
        }
        let iir = self.iir[ch].load(Ordering::Relaxed);
        let iir = iir + (((raw << IIR_COEF) - iir) >> IIR_COEF);
        self.iir[ch].store(iir, Ordering::Relaxed);
        self.values[ch].store((iir >> IIR_COEF) as u16, Ordering::Relaxed);
    }

    /// Force a channel to `value`, bypassing the filter. Used at boot so the
    /// first blocks do not see the filter climbing from zero.
    pub fn preset(&self, ch: usize, value: u16) {
        if ch >= CONTROL_CHANNELS {
            return;
        }
        let value = unsigned_saturate12(value as i32);
        self.iir[ch].store((value as i32) << IIR_COEF, Ordering::Relaxed);
        self.values[ch].store(value, Ordering::Relaxed);
    }

    /// Current filtered value of channel `ch`.
    pub fn value(&self, ch: usize) -> u16 {
        self.values
            .get(ch)
            .map(|v| v.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl ControlSource for ControlBank {
    fn snapshot(&self) -> ControlFrame {
        ControlFrame(core::array::from_fn(|ch| self.value(ch)))
    }
}
