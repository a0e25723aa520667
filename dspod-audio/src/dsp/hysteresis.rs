//! Hysteresis for noisy 12-bit control values.
//!
//! Pots and CV inputs wobble by a few LSBs even when untouched. Parameters that
//! trigger expensive or audible work (a delay-tap crossfade, a range switch)
//! only follow the control once it has moved decisively.

use crate::constants::CONTROL_FULL_SCALE;

/// Minimum change, in ADC counts, that [`hysteresis`] accepts.
pub const HYSTERESIS_COUNTS: i32 = 8;

/// Follow `new` only when it moves more than [`HYSTERESIS_COUNTS`] away from
/// `held`, or lands exactly on a rail. Returns `true` when `held` changed.
pub fn hysteresis(held: &mut i16, new: i16) -> bool {
    let delta = (new as i32 - *held as i32).abs();
    let at_rail = new == 0 || new as i32 == CONTROL_FULL_SCALE as i32;
    if delta > HYSTERESIS_COUNTS || (at_rail && delta != 0) {
        *held = new;
        true
    } else {
        false
    }
}

/// Divide the control range into `range + 1` equal zones and track which zone
/// `input` is in. The held zone only changes once `input` is more than an
/// eighth of a zone past its edge. Returns `true` when `held` changed.
pub fn ratio_hysteresis(held: &mut u16, input: u16, range: u8) -> bool {
    let zones = range as u32 + 1;
    let width = (CONTROL_FULL_SCALE as u32 + 1) / zones;
    let guard = width / 8;
    let input = input.min(CONTROL_FULL_SCALE) as u32;

    let lower = *held as u32 * width;
    let upper = lower + width;
    if input + guard >= lower && input < upper + guard {
        return false;
    }

    let zone = (input / width).min(range as u32) as u16;
    if zone == *held {
        return false;
    }
    *held = zone;
    true
}
