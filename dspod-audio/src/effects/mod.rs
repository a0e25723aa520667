//! Effect algorithms and the registry that names them.
//!
//! Every algorithm is a variant of [`EffectInstance`]; the static
//! [`EFFECTS`] table describes them to the foreground (names, parameter
//! labels, overlay group). The audio path reaches an algorithm only through
//! [`Effect::process`], one block at a time.
//!
//! | Index | Name | Parameters | Overlay |
//! |-------|------|------------|---------|
//! | 0 | `Bypass` | none | none |
//! | 1 | `VCA` | level | filter |
//! | 2 | `LPF` | freq, res | filter |
//! | 3 | `HPF` | freq, res | filter |
//! | 4 | `BPF` | freq, res | filter |
//! | 5 | `ClnDlyRam` | delay, feedback, range | delay |
//! | 6 | `ClnDlyExt` | delay, feedback, range | delay |

pub mod registry;
pub mod bypass;
pub mod vca;
pub mod filter;
pub mod clean_delay;

pub use registry::{
    descriptor, effect_count, EffectDescriptor, EffectInstance, EffectKind, OverlayGroup,
    ParamFormat, BYPASS, EFFECTS,
};

use crate::control::ControlFrame;
use crate::render::ParamBoard;

/// Error reported by an effect for one block.
///
/// The audio path replaces the block with silence and latches the fault for
/// the foreground to collect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectFault {
    /// The external memory device returned a bus error.
    ExternalMemory,
    /// An access fell outside the internal arena.
    Arena,
}

/// Everything an effect may touch while processing a block.
pub struct ProcessContext<'c, D> {
    /// Internal scratch memory owned by the active effect.
    pub arena: &'c mut [u8],
    /// External memory device.
    pub ext: &'c mut D,
    /// Control values sampled at the start of the block.
    pub controls: ControlFrame,
    /// Values published for parameter rendering.
    pub board: &'c ParamBoard,
}

/// Block-processing entry point of an effect.
///
/// `src` and `dst` are interleaved stereo of equal length. Implementations
/// must not block, allocate or log.
pub trait Effect {
    fn process<D: crate::memory::BlockDevice>(
        &mut self,
        ctx: &mut ProcessContext<'_, D>,
        dst: &mut [i16],
        src: &[i16],
    ) -> Result<(), EffectFault>;
}
