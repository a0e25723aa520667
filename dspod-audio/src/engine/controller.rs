//! Foreground engine handle: effect selection, muting, display and meters.
//!
//! Every method that changes the audio path's behaviour busy-waits for the
//! audio path to confirm the change, so it must not be called while the
//! block interrupt is stopped.

use core::sync::atomic::Ordering;

use log::{info, warn};

use super::{Level, MuteState, Shared};
use crate::effects::{
    descriptor, effect_count, EffectFault, EffectInstance, EffectKind, OverlayGroup, BYPASS,
    EFFECTS,
};
use crate::engine::overlay::OverlayLoader;
use crate::memory::BlockDevice;
use crate::render::{self, ParamCanvas, RenderCache};

/// Created by [`Engine::split`](super::Engine::split); there is exactly one
/// per engine.
pub struct Controller<'e, 'a, D, O> {
    pub(crate) shared: &'e Shared<'a, D>,
    pub(crate) overlays: &'e mut O,
    pub(crate) loaded_group: &'e mut Option<OverlayGroup>,
    pub(crate) render_cache: &'e mut RenderCache,
}

impl<D, O> Controller<'_, '_, D, O> {
    /// Index of the effect the audio path is dispatching to.
    pub fn active(&self) -> usize {
        self.shared.active()
    }

    pub fn mute_state(&self) -> MuteState {
        self.shared.mute.state()
    }

    /// Ramp the output down and wait until it is silent. Does nothing unless
    /// the output is currently fully unmuted.
    pub fn mute(&self) {
        if self.shared.mute.request_mute() {
            info!("mute: requesting mute");
            self.shared.mute.wait_for(MuteState::Muted);
        }
    }

    /// Ramp the output up and wait until it is at full level. Does nothing
    /// unless the output is currently muted.
    pub fn unmute(&self) {
        if self.shared.mute.request_unmute() {
            info!("mute: requesting unmute");
            self.shared.mute.wait_for(MuteState::Idle);
        }
    }

    pub fn effect_count(&self) -> usize {
        effect_count()
    }

    pub fn effect_name(&self, index: usize) -> Option<&'static str> {
        descriptor(index).map(|d| d.name)
    }

    pub fn current_name(&self) -> &'static str {
        self.effect_name(self.active()).unwrap_or(EFFECTS[BYPASS].name)
    }

    /// Number of parameters the active effect uses.
    pub fn param_count(&self) -> u8 {
        descriptor(self.active()).map_or(0, |d| d.param_count)
    }

    /// Label of parameter `index` of the active effect.
    pub fn param_name(&self, index: usize) -> Option<&'static str> {
        descriptor(self.active()).and_then(|d| d.param_names.get(index).copied())
    }

    /// Draw parameter `index` of the active effect. See
    /// [`render::render_parameter`].
    pub fn render_parameter<C: ParamCanvas + ?Sized>(
        &mut self,
        index: usize,
        first_draw: bool,
        canvas: &mut C,
    ) {
        if let Some(desc) = descriptor(self.active()) {
            render::render_parameter(
                desc,
                &self.shared.board,
                self.render_cache,
                index,
                first_draw,
                canvas,
            );
        }
    }

    /// Peak level since the last call, then reset.
    pub fn take_level(&self, level: Level) -> u16 {
        self.shared.meters.take(level)
    }

    /// Collect a fault latched by the audio path, if any.
    pub fn take_fault(&self) -> Option<EffectFault> {
        let fault = self.shared.take_fault();
        if let Some(f) = fault {
            warn!("effect {} faulted: {:?}", self.current_name(), f);
        }
        fault
    }

    /// Blocks processed since start-up.
    pub fn blocks_processed(&self) -> u32 {
        self.shared.blocks.load(Ordering::Relaxed)
    }
}

impl<D: BlockDevice, O: OverlayLoader> Controller<'_, '_, D, O> {
    /// Switch to effect `index`. Out-of-range and already-active indices are
    /// ignored. Returns whether a switch happened.
    ///
    /// The output is muted for the duration of the switch and the audio path
    /// runs bypass while the old effect is torn down and the new one built.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(desc) = descriptor(index) else {
            return false;
        };
        let prev = self.active();
        if index == prev {
            return false;
        }
        info!("select: {} -> {}", EFFECTS[prev].name, desc.name);

        self.mute();

        self.shared.active.store(BYPASS as u8, Ordering::Release);
        self.shared.interlock.request();
        self.shared.interlock.wait_acknowledged();

        // SAFETY: the audio path has acknowledged from a bypass block and
        // will not touch the slot until a non-bypass index is published.
        let slot = unsafe { &mut *self.shared.slot.get() };

        core::mem::replace(
            &mut slot.instance,
            EffectInstance::init(EffectKind::Bypass, 0, 0),
        )
        .cleanup();

        if let Some(group) = desc.overlay {
            if *self.loaded_group != Some(group) {
                info!("select: loading overlay {:?}", group);
                self.overlays.load(group);
                *self.loaded_group = Some(group);
            }
        }

        slot.instance = EffectInstance::init(desc.kind, slot.arena.len(), slot.ext.capacity());
        self.shared.board.reset_values();
        self.render_cache.invalidate();
        self.shared.interlock.clear();
        self.shared.active.store(index as u8, Ordering::Release);

        self.unmute();
        true
    }
}
