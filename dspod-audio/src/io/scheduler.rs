//! Block scheduling from DMA half/full interrupts.
//!
//! Receive and transmit run as circular DMA over buffers holding two blocks.
//! The half-complete interrupt hands the first half of both buffers to the
//! CPU while DMA works on the second; the complete interrupt hands over the
//! second half. The scheduler processes the half it was given and must finish
//! before DMA wraps back to it, one block period later.
//!
//! ```text
//!            DMA writes ──►                 DMA writes ──►
//! rx: ┌──────────┬──────────┐     rx: ┌──────────┬──────────┐
//!     │  First   │  Second  │         │  First   │  Second  │
//!     └──────────┴──────────┘         └──────────┴──────────┘
//!       ▲ CPU (HalfComplete)                        ▲ CPU (Complete)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! static LOAD: LoadMeter = LoadMeter::new();
//! let mut sched = FrameScheduler::new((), DwtClock, &LOAD);
//!
//! #[interrupt]
//! fn DMA1_STREAM0() {
//!     let event = if half_transfer_flag() { DmaEvent::HalfComplete } else { DmaEvent::Complete };
//!     sched.isr(event, &RX_BUF, &mut TX_BUF, &mut audio);
//! }
//! ```

use crate::constants::{CHANNELS, MAX_BLOCK_FRAMES};

use super::interleave::{pack_frames, unpack_frames};
use super::load::{CycleClock, LoadMeter};

/// Which half of a double-length DMA buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmaHalf {
    First,
    Second,
}

/// Interrupt cause reported by the DMA controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmaEvent {
    HalfComplete,
    Complete,
}

impl DmaEvent {
    /// The half that DMA has just finished with and the CPU may now use.
    pub fn cpu_half(self) -> DmaHalf {
        match self {
            DmaEvent::HalfComplete => DmaHalf::First,
            DmaEvent::Complete => DmaHalf::Second,
        }
    }
}

/// Hook for transports that need re-arming after each transfer. Circular
/// DMA needs nothing, so `()` is a transport.
pub trait Transport {
    /// Must not block.
    fn rearm(&mut self, half: DmaHalf);
}

impl Transport for () {
    fn rearm(&mut self, _half: DmaHalf) {}
}

/// Consumer of interleaved stereo blocks.
pub trait BlockProcessor {
    /// Produce `dst` from `src` (equal length, interleaved stereo). Returns
    /// an implementation-defined tag, the dispatched effect index for the
    /// engine.
    fn process_block(&mut self, dst: &mut [i16], src: &[i16]) -> usize;
}

const SCRATCH: usize = MAX_BLOCK_FRAMES * CHANNELS;

pub struct FrameScheduler<'m, T, K> {
    transport: T,
    clock: K,
    load: &'m LoadMeter,
    last_entry: u32,
    cpu_half: Option<DmaHalf>,
    rx_scratch: [i16; SCRATCH],
    tx_scratch: [i16; SCRATCH],
}

impl<'m, T: Transport, K: CycleClock> FrameScheduler<'m, T, K> {
    pub fn new(transport: T, clock: K, load: &'m LoadMeter) -> Self {
        FrameScheduler {
            transport,
            clock,
            load,
            last_entry: 0,
            cpu_half: None,
            rx_scratch: [0; SCRATCH],
            tx_scratch: [0; SCRATCH],
        }
    }

    /// The half most recently handed to the CPU.
    pub fn cpu_half(&self) -> Option<DmaHalf> {
        self.cpu_half
    }

    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Handle a DMA interrupt for interleaved `i16` buffers.
    ///
    /// `rx` and `tx` are the whole circular buffers (two blocks each).
    pub fn isr<P: BlockProcessor + ?Sized>(
        &mut self,
        event: DmaEvent,
        rx: &[i16],
        tx: &mut [i16],
        proc: &mut P,
    ) {
        debug_assert_eq!(rx.len(), tx.len());
        let entry = self.enter(event);

        let half_len = (rx.len().min(tx.len()) / 2) & !1;
        let start = match event.cpu_half() {
            DmaHalf::First => 0,
            DmaHalf::Second => half_len,
        };
        proc.process_block(
            &mut tx[start..start + half_len],
            &rx[start..start + half_len],
        );

        self.exit(entry);
    }

    /// Handle a DMA interrupt for packed buffers with one `u32` per frame.
    pub fn isr_packed<P: BlockProcessor + ?Sized>(
        &mut self,
        event: DmaEvent,
        rx: &[u32],
        tx: &mut [u32],
        proc: &mut P,
    ) {
        debug_assert_eq!(rx.len(), tx.len());
        let entry = self.enter(event);

        let half_len = rx.len().min(tx.len()) / 2;
        let start = match event.cpu_half() {
            DmaHalf::First => 0,
            DmaHalf::Second => half_len,
        };
        let rx = &rx[start..start + half_len];
        let tx = &mut tx[start..start + half_len];

        for (rx, tx) in rx.chunks(MAX_BLOCK_FRAMES).zip(tx.chunks_mut(MAX_BLOCK_FRAMES)) {
            let n = rx.len() * CHANNELS;
            unpack_frames(rx, &mut self.rx_scratch[..n]);
            proc.process_block(&mut self.tx_scratch[..n], &self.rx_scratch[..n]);
            pack_frames(&self.tx_scratch[..n], tx);
        }

        self.exit(entry);
    }

    fn enter(&mut self, event: DmaEvent) -> u32 {
        let entry = self.clock.now();
        let half = event.cpu_half();
        self.cpu_half = Some(half);
        self.transport.rearm(half);
        entry
    }

    fn exit(&mut self, entry: u32) {
        let exit = self.clock.now();
        self.load.record(self.last_entry, entry, exit);
        self.last_entry = entry;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use crate::io::load::NoClock;

    /// Doubles each sample and counts calls.
    struct Doubler {
        calls: usize,
        frames: usize,
    }

    impl BlockProcessor for Doubler {
        fn process_block(&mut self, dst: &mut [i16], src: &[i16]) -> usize {
            self.calls += 1;
            self.frames += src.len() / 2;
            for (d, s) in dst.iter_mut().zip(src) {
                *d = s.wrapping_mul(2);
            }
            0
        }
    }

    /// Clock that advances by a fixed step each read.
    struct StepClock {
        t: Cell<u32>,
        step: u32,
    }

    impl CycleClock for StepClock {
        fn now(&self) -> u32 {
            let t = self.t.get();
            self.t.set(t.wrapping_add(self.step));
            t
        }
    }

    /// Records the halves it was asked to re-arm.
    #[derive(Default)]
    struct OneShot {
        rearmed: [Option<DmaHalf>; 4],
        count: usize,
    }

    impl Transport for OneShot {
        fn rearm(&mut self, half: DmaHalf) {
            self.rearmed[self.count] = Some(half);
            self.count += 1;
        }
    }

    #[test]
    fn half_complete_processes_first_half() {
        let load = LoadMeter::new();
        let mut sched = FrameScheduler::new((), NoClock, &load);
        let rx: [i16; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut tx = [0i16; 8];
        let mut proc = Doubler { calls: 0, frames: 0 };

        sched.isr(DmaEvent::HalfComplete, &rx, &mut tx, &mut proc);
        assert_eq!(tx, [2, 4, 6, 8, 0, 0, 0, 0]);
        assert_eq!(sched.cpu_half(), Some(DmaHalf::First));

        sched.isr(DmaEvent::Complete, &rx, &mut tx, &mut proc);
        assert_eq!(tx, [2, 4, 6, 8, 10, 12, 14, 16]);
        assert_eq!(sched.cpu_half(), Some(DmaHalf::Second));
        assert_eq!(proc.frames, 4);
    }

    #[test]
    fn packed_buffers_are_converted() {
        let load = LoadMeter::new();
        let mut sched = FrameScheduler::new((), NoClock, &load);
        let rx = [0x0002_0001u32, 0x0004_0003, 0x0006_0005, 0x0008_0007];
        let mut tx = [0u32; 4];
        let mut proc = Doubler { calls: 0, frames: 0 };

        sched.isr_packed(DmaEvent::Complete, &rx, &mut tx, &mut proc);
        assert_eq!(tx, [0, 0, 0x000C_000A, 0x0010_000E]);
    }

    #[test]
    fn long_packed_halves_are_chunked() {
        let load = LoadMeter::new();
        let mut sched = FrameScheduler::new((), NoClock, &load);
        let rx = [0x0001_0001u32; 2 * 300];
        let mut tx = [0u32; 2 * 300];
        let mut proc = Doubler { calls: 0, frames: 0 };

        sched.isr_packed(DmaEvent::HalfComplete, &rx, &mut tx, &mut proc);
        assert_eq!(proc.calls, 3);
        assert_eq!(proc.frames, 300);
        assert!(tx[..300].iter().all(|&w| w == 0x0002_0002));
        assert!(tx[300..].iter().all(|&w| w == 0));
    }

    #[test]
    fn transport_rearmed_each_interrupt() {
        let load = LoadMeter::new();
        let mut sched = FrameScheduler::new(OneShot::default(), NoClock, &load);
        let rx = [0i16; 8];
        let mut tx = [0i16; 8];
        let mut proc = Doubler { calls: 0, frames: 0 };

        sched.isr(DmaEvent::HalfComplete, &rx, &mut tx, &mut proc);
        sched.isr(DmaEvent::Complete, &rx, &mut tx, &mut proc);
        let t = sched.transport();
        assert_eq!(t.count, 2);
        assert_eq!(t.rearmed[..2], [Some(DmaHalf::First), Some(DmaHalf::Second)]);
    }

    #[test]
    fn load_is_measured() {
        let load = LoadMeter::new();
        let clock = StepClock { t: Cell::new(0), step: 1000 };
        let mut sched = FrameScheduler::new((), clock, &load);
        let rx = [0i16; 8];
        let mut tx = [0i16; 8];
        let mut proc = Doubler { calls: 0, frames: 0 };

        // entry/exit readings: 0/1000, then 2000/3000
        sched.isr(DmaEvent::HalfComplete, &rx, &mut tx, &mut proc);
        sched.isr(DmaEvent::Complete, &rx, &mut tx, &mut proc);
        assert_eq!(load.active_cycles(), 1000);
        assert_eq!(load.period_cycles(), 2000);
        assert_eq!(load.load_percent(), 50);
    }
}
