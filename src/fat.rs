//! Sector allocation table assembly.
//!
//! The FAT is a flat array mapping each sector to the next sector of its
//! chain. Its own sectors are enumerated partly in the header and partly
//! in the DIFAT chain; the mini FAT is stored as an ordinary FAT chain.

use std::io::{Read, Seek};

use crate::consts::*;
use crate::error::{CfbError, Result};
use crate::header::Header;
use crate::source::read_sector;

/// Split a sector into its little-endian u32 words.
fn sector_words(data: &[u8]) -> impl Iterator<Item = u32> + '_ {
    data.chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

/// Build the FAT: read every FAT sector named by the header, then every
/// FAT sector named by the DIFAT chain, appending their words in that
/// order.
pub(crate) fn load_fat<R: Read + Seek>(source: &mut R, header: &Header) -> Result<Vec<u32>> {
    let mut fat_sectors = header.fat_sectors.clone();

    // DIFAT extension: each DIFAT sector lists FAT sectors in all words
    // but the last, which chains to the next DIFAT sector.
    let mut difat_sector = header.first_difat_sector;
    let mut remaining = header.n_difat_sectors;
    while difat_sector != ENDOFCHAIN && difat_sector != FREESECT && remaining > 0 {
        let data = read_sector(source, difat_sector, header.sector_size)?;
        let words: Vec<u32> = sector_words(&data).collect();

        for &sect in &words[..words.len() - 1] {
            if sect == FREESECT || sect == ENDOFCHAIN {
                break;
            }
            fat_sectors.push(sect);
        }

        // Full-sector reads are enforced above, so this really is the
        // sector's last word.
        difat_sector = words[words.len() - 1];
        remaining -= 1;
    }

    let words_per_sector = header.sector_size / 4;
    let mut fat = Vec::with_capacity(fat_sectors.len() * words_per_sector);
    for &sect in &fat_sectors {
        let data = read_sector(source, sect, header.sector_size)?;
        fat.extend(sector_words(&data));
    }

    Ok(fat)
}

/// Build the mini FAT by reading its regular FAT chain.
pub(crate) fn load_minifat<R: Read + Seek>(
    source: &mut R,
    header: &Header,
    fat: &[u32],
) -> Result<Vec<u32>> {
    let data = read_fat_chain(source, fat, header.sector_size, header.first_minifat_sector)?;
    Ok(data
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Read a whole FAT chain into memory, in chain order.
///
/// Used for the directory stream, the mini FAT and the mini stream. The
/// walk is bounded by the table length so a corrupted cyclic chain
/// surfaces as `Truncated` instead of spinning.
pub(crate) fn read_fat_chain<R: Read + Seek>(
    source: &mut R,
    fat: &[u32],
    sector_size: usize,
    start: u32,
) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut sector = start;
    let mut hops = 0usize;

    while sector != ENDOFCHAIN {
        if sector as usize >= fat.len() {
            return Err(CfbError::Truncated(sector));
        }
        if hops > fat.len() {
            return Err(CfbError::Truncated(sector));
        }
        hops += 1;

        data.extend_from_slice(&read_sector(source, sector, sector_size)?);
        sector = fat[sector as usize];
    }

    Ok(data)
}
