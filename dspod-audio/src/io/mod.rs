//! Frame I/O: driving the engine from the codec's DMA interrupts.
//!
//! ## Components
//!
//! | Item | Description |
//! |------|-------------|
//! | [`FrameScheduler`] | Picks the CPU-owned half of each circular buffer and runs one block |
//! | [`BlockProcessor`] | Anything that turns an input block into an output block |
//! | [`LoadMeter`] | Interrupt cost measured from a [`CycleClock`] |
//! | [`interleave`] | Packed `u32` frames to interleaved `i16` and back |
//!
//! ## DMA buffer layout
//!
//! - Receive and transmit buffers each hold two blocks
//! - DMA fires half-complete and complete interrupts
//! - The interrupt handler processes the half DMA has just left while DMA
//!   works on the other one
//! - Packed buffers carry one `u32` per frame, left in the lower 16 bits

pub mod interleave;
pub mod load;
pub mod scheduler;

pub use load::{CycleClock, LoadMeter, NoClock};
pub use scheduler::{BlockProcessor, DmaEvent, DmaHalf, FrameScheduler, Transport};
