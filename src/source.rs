//! Positioned reads over the backing byte source.
//!
//! The parser only ever needs one primitive from the device underneath:
//! deliver N bytes at offset O. Anything `Read + Seek` satisfies that.

use std::io::{Read, Seek, SeekFrom};

use crate::consts::HEADER_SIZE;
use crate::error::Result;

/// Positioned reads; no implicit cursor is part of the contract.
pub(crate) trait ReadAt {
    /// Read up to `buf.len()` bytes at `offset`. A short count means
    /// end-of-file was reached.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Read exactly `buf.len()` bytes at `offset`. A short read on a
    /// required region is an error.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> std::io::Result<()>;
}

impl<R: Read + Seek> ReadAt for R {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize> {
        self.seek(SeekFrom::Start(offset))?;
        let mut total = 0;
        while total < buf.len() {
            let n = self.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.read_exact(buf)
    }
}

/// File offset of a sector. The header always occupies the first 512
/// bytes; the sectored region starts right after it, even for 4096-byte
/// sectors.
#[inline]
pub(crate) fn sector_offset(sector: u32, sector_size: usize) -> u64 {
    HEADER_SIZE as u64 + sector as u64 * sector_size as u64
}

/// Read one full sector.
pub(crate) fn read_sector<R: Read + Seek>(
    source: &mut R,
    sector: u32,
    sector_size: usize,
) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; sector_size];
    source.read_exact_at(sector_offset(sector, sector_size), &mut buffer)?;
    Ok(buffer)
}
