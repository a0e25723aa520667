//! Serial PSRAM driver for APS6404-class parts.
//!
//! The delay line for long delays lives in an 8 MiB AP Memory APS6404L (or a
//! pin-compatible ESP-PSRAM64H / LY68L6400) on an SPI bus. The part is used in
//! plain SPI mode:
//!
//! | Command | Code | Frame |
//! |---------|------|-------|
//! | Write | `0x02` | cmd, A23..A0, data... |
//! | Fast read | `0x0B` | cmd, A23..A0, 8 wait cycles, data... |
//! | Reset enable | `0x66` | cmd |
//! | Reset | `0x99` | cmd |
//! | Read ID | `0x9F` | cmd, 3 don't-care bytes, MF ID, KGD, EID... |
//!
//! Bursts must not cross a 1 KiB page boundary, so longer transfers are split
//! into one transaction per page. Chip-select framing is left to the
//! [`SpiDevice`] implementation.

use embedded_hal::spi::{Operation, SpiDevice};

use super::BlockDevice;

const CMD_WRITE: u8 = 0x02;
const CMD_FAST_READ: u8 = 0x0B;
const CMD_RESET_ENABLE: u8 = 0x66;
const CMD_RESET: u8 = 0x99;
const CMD_READ_ID: u8 = 0x9F;

/// Burst page size in bytes.
pub const PAGE_SIZE: u32 = 1024;

/// Capacity of an APS6404L (64 Mbit).
pub const APS6404_CAPACITY: u32 = 8 * 1024 * 1024;

/// Manufacturer ID reported by AP Memory parts.
pub const MF_ID_AP_MEMORY: u8 = 0x0D;

/// Known-good-die marker in the second ID byte.
pub const KGD_PASS: u8 = 0x5D;

/// PSRAM on an `embedded-hal` SPI device.
pub struct SpiPsram<SPI> {
    spi: SPI,
    capacity: u32,
}

impl<SPI: SpiDevice> SpiPsram<SPI> {
    /// Wrap `spi` as a PSRAM of `capacity` bytes.
    pub fn new(spi: SPI, capacity: u32) -> Self {
        SpiPsram { spi, capacity }
    }

    /// Release the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Software reset. Leaves the part in SPI mode.
    pub fn reset(&mut self) -> Result<(), SPI::Error> {
        self.spi.write(&[CMD_RESET_ENABLE])?;
        self.spi.write(&[CMD_RESET])
    }

    /// Read the manufacturer ID and known-good-die bytes.
    pub fn read_id(&mut self) -> Result<(u8, u8), SPI::Error> {
        let mut id = [0u8; 2];
        self.spi.transaction(&mut [
            Operation::Write(&[CMD_READ_ID, 0, 0, 0]),
            Operation::Read(&mut id),
        ])?;
        Ok((id[0], id[1]))
    }

    /// `true` if the ID bytes identify a working AP Memory part.
    pub fn probe(&mut self) -> Result<bool, SPI::Error> {
        let (mf, kgd) = self.read_id()?;
        Ok(mf == MF_ID_AP_MEMORY && kgd == KGD_PASS)
    }

    fn header(cmd: u8, addr: u32) -> [u8; 4] {
        [cmd, (addr >> 16) as u8, (addr >> 8) as u8, addr as u8]
    }

    /// Length of the first chunk of a transfer at `addr`, stopping at the
    /// page boundary.
    fn chunk_len(addr: u32, remaining: usize) -> usize {
        let to_page_end = (PAGE_SIZE - (addr % PAGE_SIZE)) as usize;
        remaining.min(to_page_end)
    }
}

impl<SPI: SpiDevice> BlockDevice for SpiPsram<SPI> {
    type Error = SPI::Error;

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn read_at(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        let mut addr = offset;
        let mut rest = buf;
        while !rest.is_empty() {
            let n = Self::chunk_len(addr, rest.len());
            let (chunk, tail) = core::mem::take(&mut rest).split_at_mut(n);
            let h = Self::header(CMD_FAST_READ, addr);
            self.spi.transaction(&mut [
                Operation::Write(&[h[0], h[1], h[2], h[3], 0]),
                Operation::Read(chunk),
            ])?;
            addr += n as u32;
            rest = tail;
        }
        Ok(())
    }

    fn write_at(&mut self, offset: u32, data: &[u8]) -> Result<(), Self::Error> {
        let mut addr = offset;
        let mut rest = data;
        while !rest.is_empty() {
            let n = Self::chunk_len(addr, rest.len());
            let (chunk, tail) = rest.split_at(n);
            self.spi.transaction(&mut [
                Operation::Write(&Self::header(CMD_WRITE, addr)),
                Operation::Write(chunk),
            ])?;
            addr += n as u32;
            rest = tail;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{self, ErrorType};

    // ── Mock SPI PSRAM ─────────────────────────────────────────────────

    #[derive(Debug)]
    struct MockError;

    impl spi::Error for MockError {
        fn kind(&self) -> spi::ErrorKind {
            spi::ErrorKind::Other
        }
    }

    /// Mock SPI device emulating a 4 KiB PSRAM and logging each transaction.
    struct MockPsram {
        mem: [u8; 4096],
        /// (command, address, data length) per transaction.
        log: [(u8, u32, usize); 32],
        log_count: usize,
        fail: bool,
    }

    impl MockPsram {
        fn new() -> Self {
            Self {
                mem: [0; 4096],
                log: [(0, 0, 0); 32],
                log_count: 0,
                fail: false,
            }
        }

        fn transactions(&self) -> &[(u8, u32, usize)] {
            &self.log[..self.log_count]
        }
    }

    impl ErrorType for MockPsram {
        type Error = MockError;
    }

    impl SpiDevice for MockPsram {
        fn transaction(&mut self, ops: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(MockError);
            }
            let (header, data) = match ops {
                [Operation::Write(h)] => (*h, None),
                [Operation::Write(h), data] => (*h, Some(data)),
                _ => return Err(MockError),
            };
            let cmd = header[0];
            let addr = if header.len() >= 4 {
                ((header[1] as u32) << 16) | ((header[2] as u32) << 8) | header[3] as u32
            } else {
                0
            };
            let a = addr as usize;
            let len = match (cmd, data) {
                (CMD_WRITE, Some(Operation::Write(bytes))) => {
                    // a burst may not cross a page
                    assert!(a / 1024 == (a + bytes.len() - 1) / 1024);
                    self.mem[a..a + bytes.len()].copy_from_slice(&bytes[..]);
                    bytes.len()
                }
                (CMD_FAST_READ, Some(Operation::Read(buf))) => {
                    assert_eq!(header.len(), 5, "fast read needs a wait byte");
                    assert!(a / 1024 == (a + buf.len() - 1) / 1024);
                    buf.copy_from_slice(&self.mem[a..a + buf.len()]);
                    buf.len()
                }
                (CMD_READ_ID, Some(Operation::Read(buf))) => {
                    buf[0] = MF_ID_AP_MEMORY;
                    buf[1] = KGD_PASS;
                    buf.len()
                }
                (CMD_RESET_ENABLE | CMD_RESET, None) => 0,
                _ => return Err(MockError),
            };
            self.log[self.log_count] = (cmd, addr, len);
            self.log_count += 1;
            Ok(())
        }
    }

    #[test]
    fn write_then_read_within_page() {
        let mut ram = SpiPsram::new(MockPsram::new(), 4096);
        ram.write_at(0x10, &[1, 2, 3, 4]).unwrap();
        let mut buf = [0u8; 4];
        ram.read_at(0x10, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(
            ram.release().transactions(),
            &[(CMD_WRITE, 0x10, 4), (CMD_FAST_READ, 0x10, 4)]
        );
    }

    #[test]
    fn transfers_split_at_page_boundary() {
        let mut ram = SpiPsram::new(MockPsram::new(), 4096);
        let data: [u8; 64] = core::array::from_fn(|i| i as u8);
        ram.write_at(1000, &data).unwrap();
        let mut buf = [0u8; 64];
        ram.read_at(1000, &mut buf).unwrap();
        assert_eq!(buf, data);
        assert_eq!(
            ram.release().transactions(),
            &[
                (CMD_WRITE, 1000, 24),
                (CMD_WRITE, 1024, 40),
                (CMD_FAST_READ, 1000, 24),
                (CMD_FAST_READ, 1024, 40),
            ]
        );
    }

    #[test]
    fn address_is_sent_big_endian() {
        assert_eq!(
            SpiPsram::<MockPsram>::header(CMD_WRITE, 0x12_3456),
            [0x02, 0x12, 0x34, 0x56]
        );
    }

    #[test]
    fn probe_identifies_part() {
        let mut ram = SpiPsram::new(MockPsram::new(), APS6404_CAPACITY);
        ram.reset().unwrap();
        assert!(ram.probe().unwrap());
        assert_eq!(ram.capacity(), APS6404_CAPACITY);
    }

    #[test]
    fn bus_error_is_propagated() {
        let mut mock = MockPsram::new();
        mock.fail = true;
        let mut ram = SpiPsram::new(mock, 4096);
        assert!(ram.write_at(0, &[1]).is_err());
        let mut buf = [0u8; 1];
        assert!(ram.read_at(0, &mut buf).is_err());
    }
}
