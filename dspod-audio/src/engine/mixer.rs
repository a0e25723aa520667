//! Wet/dry mix with per-sample gain interpolation.
//!
//! The wet level is read once per block. Across the block the gain slides
//! linearly from the previous block's level to the new one, so knob moves do
//! not produce zipper noise:
//!
//! `out = saturate16((wet * processed + (4095 - wet) * dry) >> 12)`
//!
//! When a whole block sits at an end of the range the matching input is
//! passed through untouched, so full-dry and full-wet are bit exact.

use crate::constants::WET_FULL_SCALE;
use crate::dsp::saturate_rshift16;

/// Fractional bits of the interpolated wet gain.
const GAIN_FRAC: u32 = 16;

#[derive(Debug)]
pub struct WetDryMixer {
    prev_wet: u16,
}

impl WetDryMixer {
    pub const fn new(initial_wet: u16) -> Self {
        WetDryMixer {
            prev_wet: if initial_wet > WET_FULL_SCALE {
                WET_FULL_SCALE
            } else {
                initial_wet
            },
        }
    }

    /// Wet level the next block will start from.
    pub fn wet(&self) -> u16 {
        self.prev_wet
    }

    /// Mix one interleaved stereo block into `dst`.
    pub fn mix(&mut self, dst: &mut [i16], dry: &[i16], processed: &[i16], target_wet: u16) {
        let start = self.prev_wet;
        let target = target_wet.min(WET_FULL_SCALE);
        self.prev_wet = target;

        if start == target {
            if target == 0 {
                dst.copy_from_slice(dry);
                return;
            }
            if target == WET_FULL_SCALE {
                dst.copy_from_slice(processed);
                return;
            }
        }

        let frames = (dst.len() / 2).max(1) as i32;
        let mut live = (start as i32) << GAIN_FRAC;
        let step = (((target as i32) - (start as i32)) << GAIN_FRAC) / frames;

        for ((o, d), p) in dst
            .chunks_exact_mut(2)
            .zip(dry.chunks_exact(2))
            .zip(processed.chunks_exact(2))
        {
            let wet = live >> GAIN_FRAC;
            let dry_gain = WET_FULL_SCALE as i32 - wet;
            for ch in 0..2 {
                let mix = p[ch] as i32 * wet + d[ch] as i32 * dry_gain;
                o[ch] = saturate_rshift16::<12>(mix);
            }
            live += step;
        }
    }
}
