//! Saturating arithmetic mapped onto the Cortex-M DSP extension.
//!
//! On `thumbv7em`/`thumbv8m.main` targets with the DSP extension these compile
//! to a single `SSAT`/`USAT`. Host builds and cores without the extension use
//! the equivalent pure-Rust clamp.

/// Saturate an `i32` to `i16` range (`-32768..=32767`).
///
/// Maps to ARM `SSAT #16`.
#[inline(always)]
pub fn saturate16(val: i32) -> i16 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #16, {val}",
                out = out(reg) out,
                val = in(reg) val,
            );
        }
        out as i16
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        val.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

/// Arithmetic right shift by `RSHIFT`, then saturate to `i16`.
///
/// Maps to ARM `SSAT #16, val, ASR #RSHIFT`. The shift must be a compile-time
/// constant because the instruction encodes it as an immediate.
#[inline(always)]
pub fn saturate_rshift16<const RSHIFT: u32>(val: i32) -> i16 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #16, {val}, asr #{rshift}",
                out = out(reg) out,
                val = in(reg) val,
                rshift = const RSHIFT,
            );
        }
        out as i16
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        saturate16(val >> RSHIFT)
    }
}

/// Clamp to the unsigned 12-bit control range (`0..=4095`). Maps to `USAT #12`.
#[inline(always)]
pub fn unsigned_saturate12(val: i32) -> u16 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: u32;
        unsafe {
            core::arch::asm!(
                "usat {out}, #12, {val}",
                out = out(reg) out,
                val = in(reg) val,
            );
        }
        out as u16
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        val.clamp(0, 4095) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate16_clamps_both_rails() {
        assert_eq!(saturate16(0), 0);
        assert_eq!(saturate16(32767), 32767);
        assert_eq!(saturate16(32768), 32767);
        assert_eq!(saturate16(-32768), -32768);
        assert_eq!(saturate16(-32769), -32768);
        assert_eq!(saturate16(i32::MAX), 32767);
        assert_eq!(saturate16(i32::MIN), -32768);
    }

    #[test]
    fn saturate_rshift16_shifts_before_clamping() {
        assert_eq!(saturate_rshift16::<12>(1000 << 12), 1000);
        assert_eq!(saturate_rshift16::<12>(40000 << 12), 32767);
        assert_eq!(saturate_rshift16::<9>(-20000 * 512), -20000);
        // arithmetic shift rounds towards negative infinity
        assert_eq!(saturate_rshift16::<9>(-1), -1);
    }

    #[test]
    fn unsigned_saturate12_range() {
        assert_eq!(unsigned_saturate12(-5), 0);
        assert_eq!(unsigned_saturate12(2048), 2048);
        assert_eq!(unsigned_saturate12(5000), 4095);
    }
}
