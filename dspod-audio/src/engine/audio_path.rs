//! Interrupt-side engine handle.

use core::sync::atomic::Ordering;

use super::Shared;
use crate::constants::{CHANNELS, MAX_BLOCK_FRAMES, WET_CHANNEL};
use crate::control::ControlSource;
use crate::effects::{Effect, ProcessContext, BYPASS};
use crate::engine::mixer::WetDryMixer;
use crate::io::BlockProcessor;
use crate::memory::BlockDevice;

const CHUNK: usize = MAX_BLOCK_FRAMES * CHANNELS;

/// Processes audio blocks. Created by [`Engine::split`](super::Engine::split);
/// there is exactly one per engine.
pub struct AudioPath<'e, 'a, D, C> {
    pub(crate) shared: &'e Shared<'a, D>,
    pub(crate) controls: &'e mut C,
    pub(crate) mixer: &'e mut WetDryMixer,
    pub(crate) scratch: &'e mut [i16; CHUNK],
}

impl<D: BlockDevice, C: ControlSource> AudioPath<'_, '_, D, C> {
    /// Run one interleaved stereo block from `src` to `dst` and return the
    /// effect index it was dispatched to.
    ///
    /// Blocks longer than [`MAX_BLOCK_FRAMES`] are processed in pieces, each
    /// with a fresh control snapshot.
    pub fn process_block(&mut self, dst: &mut [i16], src: &[i16]) -> usize {
        debug_assert_eq!(dst.len(), src.len());
        let len = dst.len().min(src.len()) & !1;

        let mut dispatched = self.shared.active();
        for (d, s) in dst[..len].chunks_mut(CHUNK).zip(src[..len].chunks(CHUNK)) {
            dispatched = self.process_chunk(d, s);
        }
        dispatched
    }

    fn process_chunk(&mut self, dst: &mut [i16], src: &[i16]) -> usize {
        let shared = self.shared;
        let controls = self.controls.snapshot();
        shared.board.publish_controls(&controls);
        shared.meters.update(src, false);

        let wet = &mut self.scratch[..src.len()];
        let active = shared.active();
        let mut fault = None;

        if active == BYPASS {
            shared.interlock.acknowledge();
            wet.copy_from_slice(src);
        } else {
            // SAFETY: a non-bypass index is only published after the
            // controller has finished with the slot. See `Shared`.
            let slot = unsafe { &mut *shared.slot.get() };
            let mut ctx = ProcessContext {
                arena: &mut *slot.arena,
                ext: &mut slot.ext,
                controls,
                board: &shared.board,
            };
            if let Err(e) = slot.instance.process(&mut ctx, wet, src) {
                fault = Some(e);
            }
        }

        self.mixer.mix(dst, src, wet, controls.get(WET_CHANNEL));
        if let Some(e) = fault {
            dst.fill(0);
            shared.latch_fault(e);
        }
        shared.mute.apply(dst);
        shared.meters.update(dst, true);
        shared.blocks.fetch_add(1, Ordering::Relaxed);
        active
    }
}

impl<D: BlockDevice, C: ControlSource> BlockProcessor for AudioPath<'_, '_, D, C> {
    fn process_block(&mut self, dst: &mut [i16], src: &[i16]) -> usize {
        AudioPath::process_block(self, dst, src)
    }
}
