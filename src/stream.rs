//! Lazy stream reading.
//!
//! A stream's bytes are reconstructed by walking its sector chain. Large
//! streams chain through the FAT, one full sector per block; small
//! streams chain through the mini FAT, 64-byte blocks sliced out of the
//! root entry's mini stream. Either way the chunks come out in chain
//! order and the final block is cut to the exact stream size.

use std::io::{Read, Seek};

use bytes::Bytes;

use crate::consts::ENDOFCHAIN;
use crate::error::{CfbError, Result};
use crate::file::CompoundFile;
use crate::source::{sector_offset, ReadAt};

/// Single-pass iterator over a stream's byte chunks.
///
/// Yields `Ok(chunk)` in chain order; the cumulative length of all chunks
/// equals the directory entry's size. A failed walk yields one `Err` and
/// then ends. Not restartable; callers needing random access collect the
/// chunks.
pub struct StreamChunks<'a, R: Read + Seek> {
    file: &'a mut CompoundFile<R>,
    /// Mini stream bytes, present when the stream routes through the
    /// mini FAT
    ministream: Option<Bytes>,
    next_sector: u32,
    remaining: u64,
    hops: usize,
    done: bool,
}

impl<'a, R: Read + Seek> StreamChunks<'a, R> {
    pub(crate) fn via_fat(file: &'a mut CompoundFile<R>, start: u32, size: u64) -> Self {
        StreamChunks {
            file,
            ministream: None,
            next_sector: start,
            remaining: size,
            hops: 0,
            done: false,
        }
    }

    pub(crate) fn via_minifat(
        file: &'a mut CompoundFile<R>,
        ministream: Bytes,
        start: u32,
        size: u64,
    ) -> Self {
        StreamChunks {
            file,
            ministream: Some(ministream),
            next_sector: start,
            remaining: size,
            hops: 0,
            done: false,
        }
    }

    /// Bytes still to be delivered.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn next_chunk(&mut self) -> Result<Bytes> {
        let sector = self.next_sector;

        match &self.ministream {
            None => {
                let fat = &self.file.fat;
                if sector as usize >= fat.len() || self.hops > fat.len() {
                    return Err(CfbError::Truncated(sector));
                }
                self.next_sector = fat[sector as usize];

                let sector_size = self.file.header.sector_size;
                let take = (self.remaining).min(sector_size as u64) as usize;
                let mut buffer = vec![0u8; take];
                self.file
                    .source
                    .read_exact_at(sector_offset(sector, sector_size), &mut buffer)?;
                self.remaining -= take as u64;
                Ok(Bytes::from(buffer))
            }
            Some(ministream) => {
                let minifat = &self.file.minifat;
                if sector as usize >= minifat.len() || self.hops > minifat.len() {
                    return Err(CfbError::Truncated(sector));
                }
                self.next_sector = minifat[sector as usize];

                let mini_size = self.file.header.mini_sector_size;
                let take = (self.remaining).min(mini_size as u64) as usize;
                let start = sector as usize * mini_size;
                if start + take > ministream.len() {
                    return Err(CfbError::Truncated(sector));
                }
                self.remaining -= take as u64;
                Ok(ministream.slice(start..start + take))
            }
        }
    }
}

impl<R: Read + Seek> Iterator for StreamChunks<'_, R> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining == 0 {
            return None;
        }

        if self.next_sector == ENDOFCHAIN {
            // Chain ran out before the declared size was satisfied
            self.done = true;
            return Some(Err(CfbError::Truncated(ENDOFCHAIN)));
        }

        self.hops += 1;
        match self.next_chunk() {
            Ok(chunk) => Some(Ok(chunk)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
