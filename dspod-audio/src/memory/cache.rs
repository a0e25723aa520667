//! Small write-behind and read-ahead caches for circular buffers on a
//! [`BlockDevice`].
//!
//! A delay line touches external memory four bytes at a time, one frame per
//! sample, always at increasing addresses that wrap at the end of the buffer.
//! Issuing a bus transaction per frame would cost far more than the audio
//! math, so writes are gathered into an `N`-byte burst and reads are served
//! from one `N`-byte fetch.
//!
//! Addresses passed to the caches are relative to their [`Region`] and must
//! be below `region.len`. Consecutive addresses advance modulo `region.len`.
//!
//! The caches do not snoop each other. A reader must trail the writer by at
//! least `N` bytes so that every byte it fetches has already been flushed.

use super::BlockDevice;

/// Window `[start, start + len)` of a device that holds one circular buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub start: u32,
    pub len: u32,
}

impl Region {
    pub const fn new(start: u32, len: u32) -> Self {
        Region { start, len }
    }

    #[inline]
    fn advance(&self, addr: u32, by: u32) -> u32 {
        let next = addr + by;
        if next >= self.len {
            next - self.len
        } else {
            next
        }
    }
}

/// Write-behind cache of `N` bytes.
///
/// Bytes accumulate until the cache fills or the caller writes somewhere
/// other than the next contiguous address, then go out as a single burst.
/// A burst that would run past the end of the region is split into a tail
/// write and a head write.
pub struct WriteBehind<const N: usize> {
    region: Region,
    buf: [u8; N],
    fill: usize,
    begin: u32,
    next: u32,
}

impl<const N: usize> WriteBehind<N> {
    pub const fn new(region: Region) -> Self {
        WriteBehind {
            region,
            buf: [0; N],
            fill: 0,
            begin: 0,
            next: 0,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Bytes waiting to be written.
    pub fn pending(&self) -> usize {
        self.fill
    }

    /// Queue `data` for writing at `addr`, flushing as needed.
    pub fn write_bytes<D: BlockDevice>(
        &mut self,
        dev: &mut D,
        addr: u32,
        data: &[u8],
    ) -> Result<(), D::Error> {
        if self.fill != 0 && addr != self.next {
            self.flush(dev)?;
        }

        let mut addr = addr;
        for &byte in data {
            if self.fill == 0 {
                self.begin = addr;
            }
            self.buf[self.fill] = byte;
            self.fill += 1;
            addr = self.region.advance(addr, 1);
            self.next = addr;

            if self.fill == N {
                self.flush(dev)?;
            }
        }
        Ok(())
    }

    /// Write out any pending bytes.
    pub fn flush<D: BlockDevice>(&mut self, dev: &mut D) -> Result<(), D::Error> {
        if self.fill == 0 {
            return Ok(());
        }
        let fill = self.fill;
        self.fill = 0;

        let to_end = (self.region.len - self.begin) as usize;
        if fill <= to_end {
            dev.write_at(self.region.start + self.begin, &self.buf[..fill])
        } else {
            dev.write_at(self.region.start + self.begin, &self.buf[..to_end])?;
            dev.write_at(self.region.start, &self.buf[to_end..fill])
        }
    }
}

/// Read-ahead cache of `N` bytes.
///
/// A read at the address following the previous one is served from the
/// cache. Any other address, or an exhausted cache, triggers a fetch of up
/// to `N` bytes; near the end of the region the fetch stops short at the
/// boundary and the next fetch starts at the head.
pub struct ReadAhead<const N: usize> {
    region: Region,
    buf: [u8; N],
    avail: usize,
    pos: usize,
    next: u32,
}

impl<const N: usize> ReadAhead<N> {
    pub const fn new(region: Region) -> Self {
        ReadAhead {
            region,
            buf: [0; N],
            avail: 0,
            pos: 0,
            next: 0,
        }
    }

    /// Fill `out` with the bytes at `addr`.
    pub fn read_bytes<D: BlockDevice>(
        &mut self,
        dev: &mut D,
        addr: u32,
        out: &mut [u8],
    ) -> Result<(), D::Error> {
        if addr != self.next {
            self.invalidate();
        }

        let mut addr = addr;
        for byte in out.iter_mut() {
            if self.pos == self.avail {
                self.fetch(dev, addr)?;
            }
            *byte = self.buf[self.pos];
            self.pos += 1;
            addr = self.region.advance(addr, 1);
            self.next = addr;
        }
        Ok(())
    }

    /// Drop the cached bytes so the next read fetches from the device.
    pub fn invalidate(&mut self) {
        self.avail = 0;
        self.pos = 0;
    }

    fn fetch<D: BlockDevice>(&mut self, dev: &mut D, addr: u32) -> Result<(), D::Error> {
        let n = N.min((self.region.len - addr) as usize);
        // leave the cache empty if the device fails
        self.invalidate();
        dev.read_at(self.region.start + addr, &mut self.buf[..n])?;
        self.avail = n;
        Ok(())
    }
}
