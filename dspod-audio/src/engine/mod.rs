//! The effects engine: everything between the codec's input and output
//! blocks.
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────── AudioPath (interrupt) ─────────────┐
//!  src ──┬──►│ active effect ──► wet/dry mixer ──► mute ramp  │──► dst
//!        └──►│──────── dry ──────────┘                        │
//!            └────────────────────────────────────────────────┘
//!                   ▲ active index, slot       ▲ mute state
//!            ┌──────┴──── Controller (foreground) ───┴────────┐
//!            │ select / mute / unmute / render / meters        │
//!            └─────────────────────────────────────────────────┘
//! ```
//!
//! An [`Engine`] is built once at start-up and then [`split`](Engine::split)
//! into exactly one [`AudioPath`], driven from the block interrupt, and one
//! [`Controller`], driven from the main loop. All cross-context state is
//! atomic except the effect slot, whose ownership is handed back and forth
//! by parking the audio path on bypass (see [`interlock`]).
//!
//! ## Usage
//!
//! ```ignore
//! static CONTROLS: ControlBank = ControlBank::new(true);
//!
//! let mut engine = Engine::new(&mut ARENA, psram, &CONTROLS, NoOverlays);
//! let (audio, mut ui) = engine.split();
//! // hand `audio` to the DMA interrupt via a FrameScheduler
//!
//! ui.unmute();
//! ui.select(5); // ClnDlyRam
//! ```

pub mod audio_path;
pub mod controller;
pub mod interlock;
pub mod meters;
pub mod mixer;
pub mod mute;
pub mod overlay;

pub use audio_path::AudioPath;
pub use controller::Controller;
pub use interlock::{Interlock, InterlockState};
pub use meters::{Level, LevelMeters};
pub use mixer::WetDryMixer;
pub use mute::{MuteControl, MuteState};
pub use overlay::{NoOverlays, OverlayLoader, OverlaySection, RamOverlays};

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::constants::{CHANNELS, MAX_BLOCK_FRAMES};
use crate::effects::{EffectFault, EffectInstance, EffectKind, OverlayGroup, BYPASS};
use crate::memory::BlockDevice;
use crate::render::{ParamBoard, RenderCache};

const NO_FAULT: u8 = 0;
const FAULT_EXTERNAL: u8 = 1;
const FAULT_ARENA: u8 = 2;

/// Effect state and the memory it runs in.
pub(crate) struct EffectSlot<'a, D> {
    pub instance: EffectInstance,
    pub arena: &'a mut [u8],
    pub ext: D,
}

/// State shared by the two engine handles.
pub(crate) struct Shared<'a, D> {
    pub active: AtomicU8,
    pub mute: MuteControl,
    pub interlock: Interlock,
    pub meters: LevelMeters,
    pub board: ParamBoard,
    pub fault: AtomicU8,
    pub blocks: AtomicU32,
    pub slot: UnsafeCell<EffectSlot<'a, D>>,
}

// SAFETY: everything but `slot` is atomic. `slot` is only touched by the
// audio path while the active index is not bypass, and only by the
// controller between an acknowledged interlock and the store that publishes
// a new index, so the two contexts never access it at the same time.
unsafe impl<D: Send> Sync for Shared<'_, D> {}

impl<D> Shared<'_, D> {
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire) as usize
    }

    pub fn latch_fault(&self, fault: EffectFault) {
        let code = match fault {
            EffectFault::ExternalMemory => FAULT_EXTERNAL,
            EffectFault::Arena => FAULT_ARENA,
        };
        self.fault.store(code, Ordering::Release);
    }

    pub fn take_fault(&self) -> Option<EffectFault> {
        match self.fault.swap(NO_FAULT, Ordering::AcqRel) {
            FAULT_EXTERNAL => Some(EffectFault::ExternalMemory),
            FAULT_ARENA => Some(EffectFault::Arena),
            _ => None,
        }
    }
}

/// Owner of all engine state. See the [module docs](self).
pub struct Engine<'a, D, C, O> {
    shared: Shared<'a, D>,
    controls: C,
    overlays: O,
    mixer: WetDryMixer,
    scratch: [i16; MAX_BLOCK_FRAMES * CHANNELS],
    loaded_group: Option<OverlayGroup>,
    render_cache: RenderCache,
}

impl<'a, D: BlockDevice, C, O> Engine<'a, D, C, O> {
    /// Build an engine running bypass, muted, fully dry.
    ///
    /// `arena` is the internal scratch memory lent to effects; `ext` is the
    /// external memory device.
    pub fn new(arena: &'a mut [u8], ext: D, controls: C, overlays: O) -> Self {
        Engine {
            shared: Shared {
                active: AtomicU8::new(BYPASS as u8),
                mute: MuteControl::new(MuteState::Muted),
                interlock: Interlock::new(),
                meters: LevelMeters::new(),
                board: ParamBoard::new(),
                fault: AtomicU8::new(NO_FAULT),
                blocks: AtomicU32::new(0),
                slot: UnsafeCell::new(EffectSlot {
                    instance: EffectInstance::init(EffectKind::Bypass, 0, 0),
                    arena,
                    ext,
                }),
            },
            controls,
            overlays,
            mixer: WetDryMixer::new(0),
            scratch: [0; MAX_BLOCK_FRAMES * CHANNELS],
            loaded_group: None,
            render_cache: RenderCache::new(),
        }
    }

    /// Index of the effect the audio path is dispatching to.
    pub fn active(&self) -> usize {
        self.shared.active()
    }

    /// Split into the interrupt-side and foreground-side handles.
    pub fn split(&mut self) -> (AudioPath<'_, 'a, D, C>, Controller<'_, 'a, D, O>) {
        let audio = AudioPath {
            shared: &self.shared,
            controls: &mut self.controls,
            mixer: &mut self.mixer,
            scratch: &mut self.scratch,
        };
        let controller = Controller {
            shared: &self.shared,
            overlays: &mut self.overlays,
            loaded_group: &mut self.loaded_group,
            render_cache: &mut self.render_cache,
        };
        (audio, controller)
    }

    /// Tear down the engine and return the external device.
    pub fn release(self) -> D {
        self.shared.slot.into_inner().ext
    }
}
