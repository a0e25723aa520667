//! Glitch-free mute and unmute ramps.
//!
//! The foreground requests a transition; the audio path walks a 512-frame
//! linear ramp and reports the terminal state. Gain is applied as
//! `(sample * count) >> 9` with 16-bit saturation.
//!
//! ```text
//!          request_mute             count hits 0
//!   Idle ──────────────► RampingToMute ─────────► Muted
//!    ▲                                              │
//!    │ count hits 512                request_unmute │
//!    └──────────────── RampingToUnmute ◄────────────┘
//! ```
//!
//! The counter is only written by the foreground while the state is terminal,
//! and only by the audio path while it is ramping, so the two never race.
//! Each side publishes only the transitions it owns: the foreground leaves a
//! terminal state, the audio path leaves a ramping one. The counter rests at
//! 0 in both terminal states.

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use crate::constants::{MUTE_RAMP_LEN, MUTE_RAMP_SHIFT};
use crate::dsp::saturate_rshift16;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MuteState {
    Idle = 0,
    RampingToMute = 1,
    Muted = 2,
    RampingToUnmute = 3,
}

impl MuteState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => MuteState::RampingToMute,
            2 => MuteState::Muted,
            3 => MuteState::RampingToUnmute,
            _ => MuteState::Idle,
        }
    }
}

pub struct MuteControl {
    state: AtomicU8,
    count: AtomicU16,
}

impl MuteControl {
    pub const fn new(initial: MuteState) -> Self {
        let count = match initial {
            MuteState::RampingToMute => MUTE_RAMP_LEN,
            MuteState::Idle | MuteState::Muted | MuteState::RampingToUnmute => 0,
        };
        MuteControl {
            state: AtomicU8::new(initial as u8),
            count: AtomicU16::new(count),
        }
    }

    pub fn state(&self) -> MuteState {
        MuteState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Current ramp position, `0..=512`.
    pub fn count(&self) -> u16 {
        self.count.load(Ordering::Relaxed)
    }

    /// Start a ramp down. Honoured only from `Idle`; returns whether it was.
    pub fn request_mute(&self) -> bool {
        self.begin(MuteState::Idle, MuteState::RampingToMute, MUTE_RAMP_LEN)
    }

    /// Start a ramp up. Honoured only from `Muted`; returns whether it was.
    pub fn request_unmute(&self) -> bool {
        self.begin(MuteState::Muted, MuteState::RampingToUnmute, 0)
    }

    fn begin(&self, from: MuteState, to: MuteState, count: u16) -> bool {
        if self.state() != from {
            return false;
        }
        self.count.store(count, Ordering::Relaxed);
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Spin until the state is `target`.
    pub fn wait_for(&self, target: MuteState) {
        while self.state() != target {
            core::hint::spin_loop();
        }
    }

    /// Apply the current mute state to an interleaved stereo block.
    ///
    /// Audio path only. The state is written back only when a ramp ends.
    pub fn apply(&self, block: &mut [i16]) {
        let start = self.state();
        match start {
            MuteState::Idle => return,
            MuteState::Muted => {
                block.fill(0);
                return;
            }
            MuteState::RampingToMute | MuteState::RampingToUnmute => {}
        }
        let mut state = start;
        let mut count = self.count.load(Ordering::Relaxed);

        for frame in block.chunks_exact_mut(2) {
            match state {
                MuteState::Idle => {}
                MuteState::Muted => frame.fill(0),
                MuteState::RampingToMute => {
                    scale(frame, count);
                    count = count.saturating_sub(1);
                    if count == 0 {
                        state = MuteState::Muted;
                    }
                }
                MuteState::RampingToUnmute => {
                    scale(frame, count);
                    count += 1;
                    if count >= MUTE_RAMP_LEN {
                        count = 0;
                        state = MuteState::Idle;
                    }
                }
            }
        }

        self.count.store(count, Ordering::Relaxed);
        if state != start {
            let _ = self.state.compare_exchange(
                start as u8,
                state as u8,
                Ordering::Release,
                Ordering::Relaxed,
            );
        }
    }
}

fn scale(frame: &mut [i16], count: u16) {
    for s in frame {
        *s = saturate_rshift16::<MUTE_RAMP_SHIFT>(*s as i32 * count as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicBool;
    use std::time::{Duration, Instant};

    #[test]
    fn boots_in_requested_state() {
        assert_eq!(MuteControl::new(MuteState::Muted).state(), MuteState::Muted);
        assert_eq!(MuteControl::new(MuteState::Idle).state(), MuteState::Idle);
    }

    #[test]
    fn mute_ramp_takes_512_frames() {
        let mute = MuteControl::new(MuteState::Idle);
        assert!(mute.request_mute());

        let mut block = [1000i16; 2 * 511];
        mute.apply(&mut block);
        assert_eq!(mute.state(), MuteState::RampingToMute);
        assert_eq!(&block[..2], &[1000, 1000]);
        // gain falls by 1/512 per frame
        assert_eq!(block[2], ((1000i32 * 511) >> 9) as i16);

        let mut last = [1000i16; 2];
        mute.apply(&mut last);
        assert_eq!(last, [1, 1]);
        assert_eq!(mute.state(), MuteState::Muted);

        let mut block = [1000i16; 8];
        mute.apply(&mut block);
        assert_eq!(block, [0; 8]);
    }

    #[test]
    fn unmute_ramp_takes_512_frames() {
        let mute = MuteControl::new(MuteState::Muted);
        assert!(mute.request_unmute());

        let mut block = [-2048i16; 2 * 512];
        mute.apply(&mut block);
        assert_eq!(mute.state(), MuteState::Idle);
        assert_eq!(&block[..2], &[0, 0]);
        assert_eq!(block[2 * 511], -2044);

        let mut block = [-2048i16; 4];
        mute.apply(&mut block);
        assert_eq!(block, [-2048; 4]);
    }

    #[test]
    fn ramp_starts_at_unity_gain() {
        let mute = MuteControl::new(MuteState::Idle);
        mute.request_mute();
        let mut frame = [i16::MAX, i16::MIN];
        mute.apply(&mut frame);
        assert_eq!(frame, [i16::MAX, i16::MIN]);
    }

    #[test]
    fn requests_from_wrong_state_are_ignored() {
        let mute = MuteControl::new(MuteState::Muted);
        assert!(!mute.request_mute());
        assert_eq!(mute.state(), MuteState::Muted);

        let mute = MuteControl::new(MuteState::Idle);
        assert!(!mute.request_unmute());
        assert!(mute.request_mute());
        assert!(!mute.request_mute());
        assert_eq!(mute.state(), MuteState::RampingToMute);
    }

    #[test]
    fn wait_returns_once_state_reached() {
        let mute = MuteControl::new(MuteState::Idle);
        mute.request_mute();
        std::thread::scope(|s| {
            s.spawn(|| {
                let mut block = [0i16; 128];
                while mute.state() != MuteState::Muted {
                    mute.apply(&mut block);
                }
            });
            mute.wait_for(MuteState::Muted);
        });
        assert_eq!(mute.count(), 0);
    }

    #[test]
    fn unmute_request_survives_concurrent_muted_blocks() {
        for _ in 0..500 {
            let mute = MuteControl::new(MuteState::Muted);
            let stop = AtomicBool::new(false);
            let mut requested = false;

            std::thread::scope(|s| {
                s.spawn(|| {
                    let mut block = [100i16; 128];
                    while !stop.load(Ordering::Acquire) {
                        mute.apply(&mut block);
                    }
                });
                requested = mute.request_unmute();
                let deadline = Instant::now() + Duration::from_millis(500);
                while mute.state() != MuteState::Idle && Instant::now() < deadline {
                    core::hint::spin_loop();
                }
                stop.store(true, Ordering::Release);
            });

            assert!(requested);
            assert_eq!(mute.state(), MuteState::Idle);
        }
    }

    #[test]
    fn muted_blocks_leave_state_untouched() {
        let mute = MuteControl::new(MuteState::Muted);
        let mut block = [100i16; 8];
        mute.apply(&mut block);
        assert_eq!(block, [0; 8]);
        assert_eq!(mute.state(), MuteState::Muted);
        assert_eq!(mute.count(), 0);
    }

    #[test]
    fn booting_mid_ramp_runs_a_full_ramp() {
        let mute = MuteControl::new(MuteState::RampingToMute);
        let mut block = [100i16; 2 * 600];
        mute.apply(&mut block);
        assert_eq!(mute.state(), MuteState::Muted);
        assert_eq!(&block[..2], &[100, 100]);
        assert!(block[2 * 512..].iter().all(|&s| s == 0));

        let mute = MuteControl::new(MuteState::RampingToUnmute);
        let mut block = [100i16; 2 * 600];
        mute.apply(&mut block);
        assert_eq!(mute.state(), MuteState::Idle);
        assert_eq!(&block[..2], &[0, 0]);
        assert!(block.iter().all(|&s| (0..=100).contains(&s)));
        assert!(block[2 * 512..].iter().all(|&s| s == 100));
    }

    #[test]
    fn counter_rests_at_zero_when_idle() {
        assert_eq!(MuteControl::new(MuteState::Idle).count(), 0);

        let mute = MuteControl::new(MuteState::Muted);
        assert!(mute.request_unmute());
        let mut block = [0i16; 2 * 512];
        mute.apply(&mut block);
        assert_eq!(mute.state(), MuteState::Idle);
        assert_eq!(mute.count(), 0);

        assert!(mute.request_mute());
        assert_eq!(mute.count(), MUTE_RAMP_LEN);
    }
}
