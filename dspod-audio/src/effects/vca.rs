//! Voltage-controlled amplifier.
//!
//! Gain follows control 1 linearly from silence (0) to unity (4095):
//! `out = saturate16((in * cv) >> 12)`.

use super::{Effect, EffectFault, ProcessContext};
use crate::dsp::saturate_rshift16;
use crate::memory::BlockDevice;

#[derive(Debug, Default)]
pub struct Vca;

impl Effect for Vca {
    fn process<D: BlockDevice>(
        &mut self,
        ctx: &mut ProcessContext<'_, D>,
        dst: &mut [i16],
        src: &[i16],
    ) -> Result<(), EffectFault> {
        let gain = ctx.controls.get(0) as i32;
        for (o, &s) in dst.iter_mut().zip(src) {
            *o = saturate_rshift16::<12>(s as i32 * gain);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlFrame;
    use crate::memory::SliceDevice;
    use crate::render::ParamBoard;

    fn run(cv: u16, src: &[i16], dst: &mut [i16]) {
        let mut arena = [0u8; 0];
        let mut ext_mem = [0u8; 0];
        let mut ext = SliceDevice::new(&mut ext_mem);
        let board = ParamBoard::new();
        let mut ctx = ProcessContext {
            arena: &mut arena,
            ext: &mut ext,
            controls: ControlFrame([cv, 0, 0, 0]),
            board: &board,
        };
        Vca.process(&mut ctx, dst, src).unwrap();
    }

    #[test]
    fn zero_gain_is_silent() {
        let mut dst = [1i16; 4];
        run(0, &[1000, -1000, i16::MAX, i16::MIN], &mut dst);
        assert_eq!(dst, [0; 4]);
    }

    #[test]
    fn full_gain_is_near_unity() {
        let mut dst = [0i16; 2];
        run(4095, &[4096, -4096], &mut dst);
        assert_eq!(dst, [4095, -4095]);
    }

    #[test]
    fn half_gain_halves() {
        let mut dst = [0i16; 2];
        run(2048, &[10000, -10000], &mut dst);
        assert_eq!(dst, [5000, -5000]);
    }
}
