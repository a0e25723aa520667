//! Clean (non-modulated) stereo delay with feedback.
//!
//! The delay line is a circular buffer of stereo frames on a
//! [`BlockDevice`]: the internal arena for `ClnDlyRam`, external PSRAM for
//! `ClnDlyExt`. One write-behind cache feeds the buffer; two read-ahead caches
//! serve the main tap and the tap being faded in.
//!
//! ## Controls
//!
//! | Control | Parameter |
//! |---------|-----------|
//! | 1 | delay amount, with hysteresis |
//! | 2 | feedback level |
//! | 3 | range: short, medium, long |
//!
//! The tap offset is `(delay << (5 + 2 * range)) + 1` frames, clamped to
//! `[MIN_TAP_FRAMES, slots - 2]`. A change of delay or range opens a
//! crossfade of [`XFADE_LEN`] samples from the old tap to the new one;
//! control changes during a crossfade wait until it ends.
//!
//! ## Per-sample path
//!
//! ```text
//! in ──(+)──► write @ wptr
//!       ▲
//!       fb * level        main tap @ wptr - offset ──┐
//!       │                 alt tap  @ wptr - next  ───┴─► crossfade ──► out
//!       └──── DC blocker ◄───────────────────────────────────────────┘
//! ```
//!
//! Until the write pointer first wraps, taps that point behind the start of
//! the buffer read as silence rather than uninitialised memory. A buffer too
//! short to hold the minimum tap produces silence.

use super::{Effect, EffectFault, ProcessContext};
use crate::constants::{
    FRAME_BYTES, PSRAM_CACHE_BYTES, SAMPLE_RATE, XFADE_BITS, XFADE_LEN,
};
use crate::dsp::{hysteresis, ratio_hysteresis, saturate16, saturate_rshift16};
use crate::memory::{BlockDevice, ReadAhead, Region, SliceDevice, WriteBehind};

/// Shortest tap, in frames. Keeps the read caches behind unflushed writes.
pub const MIN_TAP_FRAMES: u32 = PSRAM_CACHE_BYTES as u32;

/// Number of selectable delay ranges.
pub const RANGES: u8 = 3;

/// Display names of the delay ranges.
pub const RANGE_NAMES: [&str; RANGES as usize] = ["Short", "Medium", "Long"];

/// Where the delay line lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayStorage {
    /// The internal scratch arena.
    Arena,
    /// The external memory device.
    External,
}

pub struct CleanDelay {
    storage: DelayStorage,
    slots: u32,
    wcache: WriteBehind<PSRAM_CACHE_BYTES>,
    main: ReadAhead<PSRAM_CACHE_BYTES>,
    alt: ReadAhead<PSRAM_CACHE_BYTES>,
    wptr: u32,
    wrapped: bool,
    offset: u32,
    next_offset: u32,
    xfade: u16,
    delay: i16,
    range: u16,
    dcb: [i32; 2],
    fb: [i16; 2],
}

impl CleanDelay {
    /// Delay line filling the first `bytes` of `storage`, rounded down to
    /// whole frames.
    pub fn new(storage: DelayStorage, bytes: u32) -> Self {
        let slots = bytes / FRAME_BYTES as u32;
        let region = Region::new(0, slots * FRAME_BYTES as u32);
        CleanDelay {
            storage,
            slots,
            wcache: WriteBehind::new(region),
            main: ReadAhead::new(region),
            alt: ReadAhead::new(region),
            wptr: 0,
            wrapped: false,
            offset: MIN_TAP_FRAMES.min(slots.saturating_sub(2)),
            next_offset: 0,
            xfade: 0,
            delay: 0,
            range: 0,
            dcb: [0; 2],
            fb: [0; 2],
        }
    }

    pub fn storage(&self) -> DelayStorage {
        self.storage
    }

    /// Delay line length in frames.
    pub fn slots(&self) -> u32 {
        self.slots
    }

    /// Current main tap offset in frames.
    pub fn tap_offset(&self) -> u32 {
        self.offset
    }

    /// `true` while a tap crossfade is in progress.
    pub fn crossfading(&self) -> bool {
        self.xfade != 0
    }

    /// Tap offset for a delay control value and range.
    pub fn offset_for(&self, delay: i16, range: u16) -> u32 {
        let shift = 5 + 2 * range as u32;
        let raw = ((delay.max(0) as u32) << shift) + 1;
        raw.max(MIN_TAP_FRAMES).min(self.slots.saturating_sub(2))
    }

    /// Block-rate control path: pick up delay/range changes and start a
    /// crossfade when the tap moves.
    fn update_tap(&mut self, delay_cv: u16, range_cv: u16) {
        if self.xfade != 0 {
            return;
        }
        let range_changed = ratio_hysteresis(&mut self.range, range_cv, RANGES - 1);
        let delay_changed = hysteresis(&mut self.delay, delay_cv as i16);
        if delay_changed || range_changed {
            self.next_offset = self.offset_for(self.delay, self.range);
            self.xfade = XFADE_LEN;
        }
    }

    /// Frame index `back` frames behind the write pointer, or `None` if that
    /// slot has not been written since start-up.
    fn tap(&self, back: u32) -> Option<u32> {
        let rptr = if back <= self.wptr {
            self.wptr - back
        } else {
            self.wptr + self.slots - back
        };
        (self.wrapped || rptr < self.wptr).then_some(rptr)
    }

    fn run<B: BlockDevice>(
        &mut self,
        dev: &mut B,
        fb_level: i32,
        dst: &mut [i16],
        src: &[i16],
    ) -> Result<(), B::Error> {
        const FRAME: u32 = FRAME_BYTES as u32;

        if self.slots < MIN_TAP_FRAMES + 2 {
            dst.fill(0);
            return Ok(());
        }

        for (o, i) in dst.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
            let mut frame = [0i16; 2];
            for ch in 0..2 {
                let mix = ((i[ch] as i32) << 12) + self.fb[ch] as i32 * fb_level;
                frame[ch] = saturate_rshift16::<12>(mix);
            }
            self.wcache
                .write_bytes(dev, self.wptr * FRAME, &frame_to_bytes(frame))?;

            let mut out = match self.tap(self.offset) {
                Some(rptr) => read_frame(&mut self.main, dev, rptr * FRAME)?,
                None => [0; 2],
            };

            if self.xfade != 0 {
                let count = self.xfade as i32;
                let rest = XFADE_LEN as i32 - count;
                match self.tap(self.next_offset) {
                    Some(rptr) => {
                        let alt = read_frame(&mut self.alt, dev, rptr * FRAME)?;
                        for ch in 0..2 {
                            let mix = out[ch] as i32 * count + alt[ch] as i32 * rest;
                            out[ch] = saturate_rshift16::<XFADE_BITS>(mix);
                        }
                    }
                    None => {
                        for s in out.iter_mut() {
                            *s = saturate_rshift16::<XFADE_BITS>(*s as i32 * count);
                        }
                    }
                }
                self.xfade -= 1;
                if self.xfade == 0 {
                    self.offset = self.next_offset;
                }
            }

            for ch in 0..2 {
                let d = out[ch] as i32 - (self.dcb[ch] >> 8);
                self.dcb[ch] += d;
                self.fb[ch] = saturate16(d);
                o[ch] = out[ch];
            }

            self.wptr += 1;
            if self.wptr == self.slots {
                self.wptr = 0;
                self.wrapped = true;
            }
        }
        Ok(())
    }
}

impl Effect for CleanDelay {
    fn process<D: BlockDevice>(
        &mut self,
        ctx: &mut ProcessContext<'_, D>,
        dst: &mut [i16],
        src: &[i16],
    ) -> Result<(), EffectFault> {
        self.update_tap(ctx.controls.get(0), ctx.controls.get(2));
        let fb_level = ctx.controls.get(1) as i32;

        let ms = self.offset_for(self.delay, self.range) / (SAMPLE_RATE / 1000);
        ctx.board.publish(0, ms.min(u16::MAX as u32) as u16);
        ctx.board.publish(2, self.range);

        match self.storage {
            DelayStorage::Arena => {
                let mut dev = SliceDevice::new(&mut *ctx.arena);
                self.run(&mut dev, fb_level, dst, src)
                    .map_err(|_| EffectFault::Arena)
            }
            DelayStorage::External => self
                .run(&mut *ctx.ext, fb_level, dst, src)
                .map_err(|_| EffectFault::ExternalMemory),
        }
    }
}

fn frame_to_bytes(frame: [i16; 2]) -> [u8; 4] {
    let l = frame[0].to_le_bytes();
    let r = frame[1].to_le_bytes();
    [l[0], l[1], r[0], r[1]]
}

fn read_frame<B: BlockDevice>(
    cache: &mut ReadAhead<PSRAM_CACHE_BYTES>,
    dev: &mut B,
    addr: u32,
) -> Result<[i16; 2], B::Error> {
    let mut b = [0u8; 4];
    cache.read_bytes(dev, addr, &mut b)?;
    Ok([i16::from_le_bytes([b[0], b[1]]), i16::from_le_bytes([b[2], b[3]])])
}
