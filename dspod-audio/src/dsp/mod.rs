//! Fixed-point DSP primitives shared by the mixer, mute ramp and effects.
//!
//! - [`saturate`]: `SSAT`/`USAT` wrappers with portable fallbacks
//! - [`hysteresis`]: jitter suppression for 12-bit control values

pub mod hysteresis;
pub mod saturate;

pub use hysteresis::{hysteresis, ratio_hysteresis};
pub use saturate::{saturate16, saturate_rshift16, unsigned_saturate12};
