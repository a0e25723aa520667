//! Static effect table and the instance enum it selects between.

use super::bypass::Bypass;
use super::clean_delay::{CleanDelay, DelayStorage};
use super::filter::{FilterMode, StateVariable};
use super::vca::Vca;
use super::{Effect, EffectFault, ProcessContext};
use crate::constants::MAX_PARAMS;
use crate::memory::BlockDevice;

/// Index of the bypass entry. The hot-swap handshake parks the audio path here.
pub const BYPASS: usize = 0;

/// Code image shared by a family of effects. Switching between effects in
/// the same group does not reload code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayGroup {
    Filter,
    Delay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    Bypass,
    Vca,
    Lowpass,
    Highpass,
    Bandpass,
    DelayArena,
    DelayExternal,
}

/// How a parameter value is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamFormat {
    /// The control value as a percentage of full scale.
    Percent,
    /// A published frequency in Hz.
    Hertz,
    /// A published duration in milliseconds.
    Millis,
    /// A published delay range index.
    Range,
}

/// Foreground-facing description of one algorithm.
#[derive(Debug)]
pub struct EffectDescriptor {
    pub name: &'static str,
    /// Parameters the algorithm actually uses.
    pub param_count: u8,
    pub param_names: [&'static str; MAX_PARAMS],
    pub formats: [ParamFormat; MAX_PARAMS],
    pub overlay: Option<OverlayGroup>,
    pub kind: EffectKind,
}

const fn filter_entry(name: &'static str, kind: EffectKind) -> EffectDescriptor {
    EffectDescriptor {
        name,
        param_count: 2,
        param_names: ["Freq", "Res", ""],
        formats: [ParamFormat::Hertz, ParamFormat::Percent, ParamFormat::Percent],
        overlay: Some(OverlayGroup::Filter),
        kind,
    }
}

const fn delay_entry(name: &'static str, kind: EffectKind) -> EffectDescriptor {
    EffectDescriptor {
        name,
        param_count: 3,
        param_names: ["DlyAmt", "Feedbk", "Range"],
        formats: [ParamFormat::Millis, ParamFormat::Percent, ParamFormat::Range],
        overlay: Some(OverlayGroup::Delay),
        kind,
    }
}

/// The registry, in menu order.
pub static EFFECTS: [EffectDescriptor; 7] = [
    EffectDescriptor {
        name: "Bypass",
        param_count: 0,
        param_names: ["CV1", "CV2", "CV3"],
        formats: [ParamFormat::Percent; MAX_PARAMS],
        overlay: None,
        kind: EffectKind::Bypass,
    },
    EffectDescriptor {
        name: "VCA",
        param_count: 1,
        param_names: ["Level", "", ""],
        formats: [ParamFormat::Percent; MAX_PARAMS],
        overlay: Some(OverlayGroup::Filter),
        kind: EffectKind::Vca,
    },
    filter_entry("LPF", EffectKind::Lowpass),
    filter_entry("HPF", EffectKind::Highpass),
    filter_entry("BPF", EffectKind::Bandpass),
    delay_entry("ClnDlyRam", EffectKind::DelayArena),
    delay_entry("ClnDlyExt", EffectKind::DelayExternal),
];

/// State of the running algorithm.
pub enum EffectInstance {
    Bypass(Bypass),
    Vca(Vca),
    Filter(StateVariable),
    Delay(CleanDelay),
}

impl EffectInstance {
    /// Fresh state for `kind`. `arena_len` and `ext_capacity` size the delay
    /// lines.
    pub fn init(kind: EffectKind, arena_len: usize, ext_capacity: u32) -> Self {
        match kind {
            EffectKind::Bypass => EffectInstance::Bypass(Bypass),
            EffectKind::Vca => EffectInstance::Vca(Vca),
            EffectKind::Lowpass => EffectInstance::Filter(StateVariable::new(FilterMode::Lowpass)),
            EffectKind::Highpass => EffectInstance::Filter(StateVariable::new(FilterMode::Highpass)),
            EffectKind::Bandpass => EffectInstance::Filter(StateVariable::new(FilterMode::Bandpass)),
            EffectKind::DelayArena => {
                let bytes = arena_len.min(u32::MAX as usize) as u32;
                EffectInstance::Delay(CleanDelay::new(DelayStorage::Arena, bytes))
            }
            EffectKind::DelayExternal => {
                EffectInstance::Delay(CleanDelay::new(DelayStorage::External, ext_capacity))
            }
        }
    }

    /// Release the instance. Nothing survives into the next `init`.
    pub fn cleanup(self) {
        drop(self);
    }
}

impl Effect for EffectInstance {
    fn process<D: BlockDevice>(
        &mut self,
        ctx: &mut ProcessContext<'_, D>,
        dst: &mut [i16],
        src: &[i16],
    ) -> Result<(), EffectFault> {
        match self {
            EffectInstance::Bypass(fx) => fx.process(ctx, dst, src),
            EffectInstance::Vca(fx) => fx.process(ctx, dst, src),
            EffectInstance::Filter(fx) => fx.process(ctx, dst, src),
            EffectInstance::Delay(fx) => fx.process(ctx, dst, src),
        }
    }
}

/// Number of registered effects.
pub fn effect_count() -> usize {
    EFFECTS.len()
}

/// Descriptor at `index`, if any.
pub fn descriptor(index: usize) -> Option<&'static EffectDescriptor> {
    EFFECTS.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bypass_is_first_and_has_no_overlay() {
        assert_eq!(EFFECTS[BYPASS].kind, EffectKind::Bypass);
        assert_eq!(EFFECTS[BYPASS].overlay, None);
        assert_eq!(EFFECTS[BYPASS].param_count, 0);
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in EFFECTS.iter().enumerate() {
            for b in &EFFECTS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn param_counts_fit() {
        for fx in &EFFECTS {
            assert!(fx.param_count as usize <= MAX_PARAMS, "{}", fx.name);
            for name in &fx.param_names[..fx.param_count as usize] {
                assert!(!name.is_empty(), "{}", fx.name);
            }
        }
    }

    #[test]
    fn delays_share_a_group() {
        assert_eq!(EFFECTS[5].overlay, EFFECTS[6].overlay);
        assert_ne!(EFFECTS[5].overlay, EFFECTS[2].overlay);
    }

    #[test]
    fn init_sizes_delay_from_its_storage() {
        match EffectInstance::init(EffectKind::DelayArena, 8192, 1 << 20) {
            EffectInstance::Delay(d) => {
                assert_eq!(d.storage(), DelayStorage::Arena);
                assert_eq!(d.slots(), 2048);
            }
            _ => panic!("expected a delay"),
        }
        match EffectInstance::init(EffectKind::DelayExternal, 8192, 1 << 20) {
            EffectInstance::Delay(d) => assert_eq!(d.slots(), 1 << 18),
            _ => panic!("expected a delay"),
        }
    }

    #[test]
    fn lookup_out_of_range() {
        assert!(descriptor(effect_count()).is_none());
        assert_eq!(descriptor(1).map(|d| d.name), Some("VCA"));
    }
}
