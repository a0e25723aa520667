//! Rendezvous between the foreground and the audio path around an effect
//! switch.
//!
//! The foreground parks the audio path on bypass, raises `Requested`, and
//! waits. The audio path answers `Acknowledged` only from a block it is
//! dispatching to bypass, which proves it has finished with the previous
//! effect's state and code. Until the foreground publishes a new index, the
//! effect slot and any overlay region belong to the foreground.

use core::sync::atomic::{AtomicU8, Ordering};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterlockState {
    None = 0,
    Requested = 1,
    Acknowledged = 2,
}

pub struct Interlock(AtomicU8);

impl Interlock {
    pub const fn new() -> Self {
        Interlock(AtomicU8::new(InterlockState::None as u8))
    }

    pub fn state(&self) -> InterlockState {
        match self.0.load(Ordering::Acquire) {
            1 => InterlockState::Requested,
            2 => InterlockState::Acknowledged,
            _ => InterlockState::None,
        }
    }

    /// Foreground: raise the request.
    pub fn request(&self) {
        self.0.store(InterlockState::Requested as u8, Ordering::Release);
    }

    /// Foreground: spin until the audio path has answered.
    pub fn wait_acknowledged(&self) {
        while self.state() != InterlockState::Acknowledged {
            core::hint::spin_loop();
        }
    }

    /// Foreground: drop back to idle once the switch is complete.
    pub fn clear(&self) {
        self.0.store(InterlockState::None as u8, Ordering::Release);
    }

    /// Audio path, bypass blocks only: answer a pending request.
    /// Returns `true` if a request was acknowledged.
    pub fn acknowledge(&self) -> bool {
        self.0
            .compare_exchange(
                InterlockState::Requested as u8,
                InterlockState::Acknowledged as u8,
                Ordering::AcqRel,
                Ordering::Relaxed,
            )
            .is_ok()
    }
}

impl Default for Interlock {
    fn default() -> Self {
        Self::new()
    }
}
