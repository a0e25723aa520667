//! Resonant state-variable filter (Chamberlin topology).
//!
//! One structure serves the low-pass, high-pass and band-pass effects; the
//! variant only chooses which state is sent to the output.
//!
//! - Control 1: cutoff, exponential over eight octaves from 20 Hz.
//! - Control 2: resonance, damping from 2.0 (none) down to 0.1.
//!
//! Coefficients are recomputed once per block. The cutoff ceiling keeps
//! `f² + 2fq < 4`, the stability bound of the discrete recursion, for every
//! damping value.

use libm::{exp2f, sinf};

use super::{Effect, EffectFault, ProcessContext};
use crate::constants::{CONTROL_FULL_SCALE, SAMPLE_RATE};
use crate::dsp::saturate16;
use crate::memory::BlockDevice;

const MIN_CUTOFF_HZ: f32 = 20.0;
const CUTOFF_OCTAVES: f32 = 8.0;
const MAX_DAMPING: f32 = 2.0;
const MIN_DAMPING: f32 = 0.1;

/// Which filter output an instance produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Lowpass,
    Highpass,
    Bandpass,
}

#[derive(Debug)]
pub struct StateVariable {
    mode: FilterMode,
    low: [f32; 2],
    band: [f32; 2],
}

impl StateVariable {
    pub const fn new(mode: FilterMode) -> Self {
        StateVariable {
            mode,
            low: [0.0; 2],
            band: [0.0; 2],
        }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Cutoff frequency in Hz for a control value.
    pub fn cutoff_hz(cv: u16) -> f32 {
        let x = cv.min(CONTROL_FULL_SCALE) as f32 / CONTROL_FULL_SCALE as f32;
        MIN_CUTOFF_HZ * exp2f(x * CUTOFF_OCTAVES)
    }

    fn damping(cv: u16) -> f32 {
        let x = cv.min(CONTROL_FULL_SCALE) as f32 / CONTROL_FULL_SCALE as f32;
        MAX_DAMPING - (MAX_DAMPING - MIN_DAMPING) * x
    }
}

impl Effect for StateVariable {
    fn process<D: BlockDevice>(
        &mut self,
        ctx: &mut ProcessContext<'_, D>,
        dst: &mut [i16],
        src: &[i16],
    ) -> Result<(), EffectFault> {
        let hz = Self::cutoff_hz(ctx.controls.get(0));
        let f = 2.0 * sinf(core::f32::consts::PI * hz / SAMPLE_RATE as f32);
        let q = Self::damping(ctx.controls.get(1));
        ctx.board.publish(0, hz as u16);

        for (o, i) in dst.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
            for ch in 0..2 {
                let x = i[ch] as f32;
                let low = self.low[ch] + f * self.band[ch];
                let high = x - low - q * self.band[ch];
                let band = self.band[ch] + f * high;
                self.low[ch] = low;
                self.band[ch] = band;

                let y = match self.mode {
                    FilterMode::Lowpass => low,
                    FilterMode::Highpass => high,
                    FilterMode::Bandpass => band,
                };
                o[ch] = saturate16(y as i32);
            }
        }
        Ok(())
    }
}
