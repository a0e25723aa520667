//! # dspod-audio
//!
//! A `no_std`, zero-allocation real-time effects engine for a stereo guitar
//! pedal. Audio arrives from the codec in fixed blocks, runs through the
//! selected effect, is blended with the dry signal by a wet/dry control and
//! leaves through a click-free mute ramp. The foreground switches effects,
//! mutes and unmutes, draws parameters and reads meters without ever
//! blocking the audio interrupt.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | I/O | [`io`] | DMA half/full scheduling, frame packing, load metering |
//! | Engine | [`engine`] | Effect dispatch, hot-swap interlock, wet/dry mix, mute ramp, meters |
//! | Effects | [`effects`] | Effect registry and implementations |
//! | Memory | [`memory`] | Block devices, PSRAM driver, write-behind and read-ahead caches |
//! | Controls | [`control`] | Smoothed control voltages shared with the audio path |
//! | Display | [`render`] | Parameter formatting and dirty-region redraw |
//! | DSP | [`dsp`] | Saturation and control hysteresis helpers |
//!
//! ## Quick start
//!
//! ```ignore
//! use dspod_audio::control::ControlBank;
//! use dspod_audio::engine::{Engine, NoOverlays};
//! use dspod_audio::io::{DmaEvent, FrameScheduler, LoadMeter, NoClock};
//! use dspod_audio::memory::SpiPsram;
//!
//! static CONTROLS: ControlBank = ControlBank::new(true);
//! static LOAD: LoadMeter = LoadMeter::new();
//!
//! let psram = SpiPsram::new(spi, APS6404_CAPACITY);
//! let mut engine = Engine::new(&mut ARENA, psram, &CONTROLS, NoOverlays);
//! let (mut audio, mut ui) = engine.split();
//! let mut sched = FrameScheduler::new((), NoClock, &LOAD);
//!
//! // In the DMA interrupt:
//! sched.isr_packed(DmaEvent::HalfComplete, &RX, &mut TX, &mut audio);
//!
//! // In the main loop:
//! ui.unmute();
//! ui.select(6); // ClnDlyExt
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `spi-psram` | yes | SPI PSRAM driver (requires `embedded-hal`) |
//!
//! ## Audio parameters
//!
//! - **Block size:** 64 frames ([`constants::BLOCK_FRAMES`])
//! - **Sample rate:** 48 kHz ([`constants::SAMPLE_RATE`])
//! - **Sample format:** interleaved stereo `i16`
//! - **Controls:** four 12-bit channels, the last one is wet/dry

#![cfg_attr(not(test), no_std)]

pub mod constants;
pub mod control;
pub mod dsp;
pub mod effects;
pub mod engine;
pub mod io;
pub mod memory;
pub mod render;
