//! Compound file header parsing.

use crate::binary::{read_u16_le, read_u32_le};
use crate::consts::*;
use crate::error::{CfbError, Result};

/// Parsed file header. Immutable once built; every later phase takes its
/// geometry and chain roots from here.
#[derive(Debug, Clone)]
pub struct Header {
    /// Class id of the whole file (opaque, usually all zero)
    pub class_id: [u8; 16],
    /// Minor format version
    pub minor_version: u16,
    /// Major format version (3 for 512-byte sectors, 4 for 4096)
    pub major_version: u16,
    /// Sector size in bytes, 2^sector_shift
    pub sector_size: usize,
    /// Mini sector size in bytes, 2^mini_sector_shift (typically 64)
    pub mini_sector_size: usize,
    /// Number of FAT sectors in the file
    pub n_fat_sectors: u32,
    /// First sector of the directory chain
    pub first_dir_sector: u32,
    /// Streams strictly smaller than this live in the mini stream
    pub mini_stream_cutoff: u32,
    /// First sector of the mini FAT chain
    pub first_minifat_sector: u32,
    /// Number of mini FAT sectors
    pub n_minifat_sectors: u32,
    /// First DIFAT sector, or ENDOFCHAIN when the header list suffices
    pub first_difat_sector: u32,
    /// Number of DIFAT sectors
    pub n_difat_sectors: u32,
    /// FAT sector numbers embedded in the header (up to 109, stopped at
    /// the first sentinel)
    pub fat_sectors: Vec<u32>,
}

impl Header {
    /// Parse the 512-byte header block at the start of the file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(CfbError::InvalidFormat(format!(
                "header requires {} bytes, got {}",
                HEADER_SIZE,
                data.len()
            )));
        }

        if &data[0..8] != MAGIC {
            return Err(CfbError::InvalidFormat("bad magic bytes".to_string()));
        }

        let mut class_id = [0u8; 16];
        class_id.copy_from_slice(&data[8..24]);

        let minor_version = read_u16_le(data, 24)?;
        let major_version = read_u16_le(data, 26)?;
        let byte_order = read_u16_le(data, 28)?;
        let sector_shift = read_u16_le(data, 30)?;
        let mini_sector_shift = read_u16_le(data, 32)?;
        let n_fat_sectors = read_u32_le(data, 44)?;
        let first_dir_sector = read_u32_le(data, 48)?;
        let mini_stream_cutoff = read_u32_le(data, 56)?;
        let first_minifat_sector = read_u32_le(data, 60)?;
        let n_minifat_sectors = read_u32_le(data, 64)?;
        let first_difat_sector = read_u32_le(data, 68)?;
        let n_difat_sectors = read_u32_le(data, 72)?;

        if byte_order != 0xFFFE {
            return Err(CfbError::InvalidFormat(format!(
                "byte order mark {:#06X}, expected 0xFFFE",
                byte_order
            )));
        }

        // Shifts above 31 would overflow; real files use 9 or 12
        if sector_shift >= 32 || mini_sector_shift >= 32 {
            return Err(CfbError::InvalidFormat("sector shift out of range".to_string()));
        }
        let sector_size = 1usize << sector_shift;
        let mini_sector_size = 1usize << mini_sector_shift;

        // Only two (version, sector size) pairings exist
        let supported = (major_version == 3 && sector_size == 512)
            || (major_version == 4 && sector_size == 4096);
        if !supported {
            return Err(CfbError::VersionMismatch {
                major: major_version,
                sector_size,
            });
        }

        // The embedded FAT sector list ends at the first sentinel
        let mut fat_sectors = Vec::new();
        for i in 0..HEADER_FAT_SLOTS {
            let sect = read_u32_le(data, HEADER_FAT_OFFSET + i * 4)?;
            if sect == FREESECT || sect == ENDOFCHAIN {
                break;
            }
            fat_sectors.push(sect);
        }

        Ok(Header {
            class_id,
            minor_version,
            major_version,
            sector_size,
            mini_sector_size,
            n_fat_sectors,
            first_dir_sector,
            mini_stream_cutoff,
            first_minifat_sector,
            n_minifat_sectors,
            first_difat_sector,
            n_difat_sectors,
            fat_sectors,
        })
    }
}
