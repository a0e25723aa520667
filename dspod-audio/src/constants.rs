/// Audio sample rate in Hz.
pub const SAMPLE_RATE: u32 = 48_000;

/// Interleaved channels per frame (left, right).
pub const CHANNELS: usize = 2;

/// Stereo frames delivered per scheduler invocation.
pub const BLOCK_FRAMES: usize = 64;

/// Largest block the engine will process in one call. Longer blocks are split.
pub const MAX_BLOCK_FRAMES: usize = 128;

/// Length of the mute/unmute ramp in stereo frames.
pub const MUTE_RAMP_LEN: u16 = 512;

/// `log2(MUTE_RAMP_LEN)`; the ramp gain is `(sample * count) >> MUTE_RAMP_SHIFT`.
pub const MUTE_RAMP_SHIFT: u32 = 9;

/// Full-scale control value (12-bit ADC).
pub const CONTROL_FULL_SCALE: u16 = 4095;

/// Wet level meaning "processed signal only".
pub const WET_FULL_SCALE: u16 = CONTROL_FULL_SCALE;

/// Number of analog control channels.
pub const CONTROL_CHANNELS: usize = 4;

/// Control channel that drives the wet/dry mix.
pub const WET_CHANNEL: usize = 3;

/// Maximum number of user parameters per effect.
pub const MAX_PARAMS: usize = 3;

/// Default size of the internal scratch arena handed to effects.
pub const ARENA_BYTES: usize = 256 * 1024;

/// Size of each write-behind / read-ahead cache in front of external memory.
pub const PSRAM_CACHE_BYTES: usize = 64;

/// Bytes per stereo frame in the delay store (two little-endian `i16`).
pub const FRAME_BYTES: usize = 4;

/// `log2` of the delay-tap crossfade window.
pub const XFADE_BITS: u32 = 11;

/// Delay-tap crossfade window in samples.
pub const XFADE_LEN: u16 = 1 << XFADE_BITS;
