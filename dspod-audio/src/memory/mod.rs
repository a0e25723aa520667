//! Byte-addressed storage for delay lines.
//!
//! Long delays do not fit in on-chip RAM, so the delay line lives on a
//! [`BlockDevice`]: either a slice of the internal arena ([`SliceDevice`]) or
//! an external serial PSRAM ([`SpiPsram`], behind the `spi-psram` feature).
//! Per-sample access to slow external memory goes through the small
//! write-behind and read-ahead caches in [`cache`].
//!
//! ## Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BlockDevice`] | Random-access byte storage with a fallible bus |
//! | [`SliceDevice`] | RAM-backed device over a borrowed byte slice |
//! | [`Region`] | Window of a device holding one circular buffer |
//! | [`WriteBehind`] | Coalesces sequential writes into cache-size bursts |
//! | [`ReadAhead`] | Serves sequential reads from one burst fetch |
//! | [`SpiPsram`] | APS6404-class serial PSRAM over `embedded-hal` SPI |

pub mod cache;

#[cfg(feature = "spi-psram")]
pub mod spi_psram;

pub use cache::{ReadAhead, Region, WriteBehind};

#[cfg(feature = "spi-psram")]
pub use spi_psram::SpiPsram;

/// Random-access byte storage.
///
/// Offsets are absolute device addresses. Implementations may assume callers
/// stay within `0..capacity()`; out-of-range access is reported through
/// `Self::Error` rather than a panic.
pub trait BlockDevice {
    /// Bus or range error.
    type Error: core::fmt::Debug;

    /// Size of the device in bytes.
    fn capacity(&self) -> u32;

    /// Fill `buf` with the bytes starting at `offset`.
    fn read_at(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Store `data` starting at `offset`.
    fn write_at(&mut self, offset: u32, data: &[u8]) -> Result<(), Self::Error>;
}

impl<D: BlockDevice + ?Sized> BlockDevice for &mut D {
    type Error = D::Error;

    fn capacity(&self) -> u32 {
        (**self).capacity()
    }

    fn read_at(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read_at(offset, buf)
    }

    fn write_at(&mut self, offset: u32, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_at(offset, data)
    }
}

/// Access outside the bounds of a [`SliceDevice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfRange {
    pub offset: u32,
    pub len: usize,
}

/// [`BlockDevice`] over a borrowed byte slice.
pub struct SliceDevice<'a> {
    mem: &'a mut [u8],
}

impl<'a> SliceDevice<'a> {
    pub fn new(mem: &'a mut [u8]) -> Self {
        SliceDevice { mem }
    }

    /// Borrow the backing bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.mem
    }

    fn span(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>, OutOfRange> {
        let start = offset as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.mem.len() => Ok(start..end),
            _ => Err(OutOfRange { offset, len }),
        }
    }
}

impl BlockDevice for SliceDevice<'_> {
    type Error = OutOfRange;

    fn capacity(&self) -> u32 {
        self.mem.len().min(u32::MAX as usize) as u32
    }

    fn read_at(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        let span = self.span(offset, buf.len())?;
        buf.copy_from_slice(&self.mem[span]);
        Ok(())
    }

    fn write_at(&mut self, offset: u32, data: &[u8]) -> Result<(), Self::Error> {
        let span = self.span(offset, data.len())?;
        self.mem[span].copy_from_slice(data);
        Ok(())
    }
}
