//! Straight-through copy. Always registry index 0.

use super::{Effect, EffectFault, ProcessContext};
use crate::memory::BlockDevice;

/// Copies input to output. Holds no state.
#[derive(Debug, Default)]
pub struct Bypass;

impl Effect for Bypass {
    fn process<D: BlockDevice>(
        &mut self,
        _ctx: &mut ProcessContext<'_, D>,
        dst: &mut [i16],
        src: &[i16],
    ) -> Result<(), EffectFault> {
        dst.copy_from_slice(src);
        Ok(())
    }
}
