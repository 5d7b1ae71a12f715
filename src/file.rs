//! The compound file parser.
//!
//! [`CompoundFile`] owns the backing byte source and runs the parse
//! phases in order on open: header, FAT (with DIFAT extension),
//! directory, mini FAT, then property-set decoding for the streams that
//! carry one. Everything assembled is immutable afterwards; stream bytes
//! are read on demand.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use bytes::Bytes;

use crate::consts::*;
use crate::directory::{self, DirEntry, EntryKind};
use crate::error::{CfbError, Result};
use crate::fat;
use crate::header::Header;
use crate::property::parse_property_set;
use crate::source::ReadAt;
use crate::stream::StreamChunks;

/// A parsed compound file.
///
/// # Examples
///
/// ```no_run
/// use longan::CompoundFile;
///
/// # fn main() -> longan::Result<()> {
/// let mut cfb = CompoundFile::open_path("report.doc")?;
///
/// for path in cfb.list_streams() {
///     println!("stream: {}", path.join("/"));
/// }
///
/// if let Some(id) = cfb.find_stream("WordDocument") {
///     let data = cfb.read_stream(id)?;
///     println!("{} bytes", data.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CompoundFile<R: Read + Seek> {
    pub(crate) source: R,
    pub(crate) header: Header,
    pub(crate) fat: Vec<u32>,
    pub(crate) minifat: Vec<u32>,
    pub(crate) entries: Vec<DirEntry>,
    /// Mini stream bytes, loaded on first mini-FAT read
    pub(crate) ministream: Option<Bytes>,
}

impl CompoundFile<File> {
    /// Open a compound file on disk.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        CompoundFile::open(File::open(path)?)
    }
}

impl<R: Read + Seek> CompoundFile<R> {
    /// Parse a compound file from any seekable byte source.
    ///
    /// The source is owned by the parser until [`close`](Self::close).
    /// The first failing phase aborts the open; a header failure means
    /// the file is not usable at all. Property-set decoding failures are
    /// the one exception: the affected entry just ends up without
    /// `properties`.
    pub fn open(mut source: R) -> Result<Self> {
        let mut raw_header = [0u8; HEADER_SIZE];
        let got = source.read_at(0, &mut raw_header)?;
        if got < HEADER_SIZE {
            return Err(CfbError::InvalidFormat(format!(
                "file holds {got} bytes, the header needs {HEADER_SIZE}"
            )));
        }
        let header = Header::parse(&raw_header)?;

        let fat = fat::load_fat(&mut source, &header)?;

        let dir_data = fat::read_fat_chain(
            &mut source,
            &fat,
            header.sector_size,
            header.first_dir_sector,
        )?;
        let mut entries = directory::parse_directory(&dir_data, header.major_version)?;
        directory::lift_tree(&mut entries);

        let minifat = if header.n_minifat_sectors > 0 {
            fat::load_minifat(&mut source, &header, &fat)?
        } else {
            Vec::new()
        };

        let mut file = CompoundFile {
            source,
            header,
            fat,
            minifat,
            entries,
            ministream: None,
        };
        file.decode_property_sets();

        Ok(file)
    }

    /// The parsed file header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The root storage entry.
    pub fn root(&self) -> &DirEntry {
        // parse_directory guarantees a root at index 0
        &self.entries[0]
    }

    /// Look up a directory entry by id.
    pub fn entry(&self, id: u32) -> Option<&DirEntry> {
        self.entries.get(id as usize)
    }

    /// All directory entries, in directory order.
    pub fn entries(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter()
    }

    /// Child entries of a storage, in no particular order.
    pub fn children(&self, id: u32) -> impl Iterator<Item = &DirEntry> {
        let children: &[u32] = self
            .entries
            .get(id as usize)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[]);
        children
            .iter()
            .filter_map(|&child| self.entries.get(child as usize))
    }

    /// Find a stream entry by name, case-insensitively, anywhere in the
    /// directory.
    pub fn find_stream(&self, name: &str) -> Option<u32> {
        let wanted = name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.is_stream() && entry.name.to_lowercase() == wanted)
            .map(|entry| entry.id)
    }

    /// Open a stream for chunked reading.
    ///
    /// Streams at least as large as the header's mini-stream cutoff read
    /// through the FAT; smaller ones read through the mini FAT inside
    /// the root entry's mini stream.
    pub fn stream(&mut self, id: u32) -> Result<StreamChunks<'_, R>> {
        let (start, size) = match self.entries.get(id as usize) {
            Some(entry) => match entry.kind {
                EntryKind::Stream { start_sector, size } => (start_sector, size),
                _ => {
                    return Err(CfbError::NoSuchStream(format!(
                        "directory entry {id} ({}) is not a stream",
                        entry.name
                    )))
                }
            },
            None => return Err(CfbError::NoSuchStream(format!("directory entry {id}"))),
        };

        if size < self.header.mini_stream_cutoff as u64 {
            let ministream = self.ministream()?;
            Ok(StreamChunks::via_minifat(self, ministream, start, size))
        } else {
            Ok(StreamChunks::via_fat(self, start, size))
        }
    }

    /// Read a whole stream into memory.
    pub fn read_stream(&mut self, id: u32) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        for chunk in self.stream(id)? {
            data.extend_from_slice(&chunk?);
        }
        Ok(data)
    }

    /// Read a whole stream by name.
    pub fn read_stream_by_name(&mut self, name: &str) -> Result<Vec<u8>> {
        let id = self
            .find_stream(name)
            .ok_or_else(|| CfbError::NoSuchStream(name.to_string()))?;
        self.read_stream(id)
    }

    /// Paths of all streams in the file, one `Vec` of storage names plus
    /// the stream name per stream.
    pub fn list_streams(&self) -> Vec<Vec<String>> {
        let mut streams = Vec::new();
        let mut seen = vec![false; self.entries.len()];
        let mut work: Vec<(u32, Vec<String>)> = vec![(0, Vec::new())];

        while let Some((id, path)) = work.pop() {
            let i = id as usize;
            if i >= self.entries.len() || seen[i] {
                continue;
            }
            seen[i] = true;

            let entry = &self.entries[i];
            match entry.kind {
                EntryKind::Stream { .. } => {
                    let mut full = path;
                    full.push(entry.name.clone());
                    streams.push(full);
                }
                EntryKind::Storage { .. } | EntryKind::Root { .. } => {
                    let mut prefix = path;
                    if !matches!(entry.kind, EntryKind::Root { .. }) {
                        prefix.push(entry.name.clone());
                    }
                    for &child in &entry.children {
                        work.push((child, prefix.clone()));
                    }
                }
            }
        }

        streams
    }

    /// Release the parser and hand back the byte source.
    pub fn close(self) -> R {
        self.source
    }

    /// The mini stream: the root entry's own FAT-chained stream, cached
    /// after the first load. `Bytes` clones are cheap reference bumps.
    pub(crate) fn ministream(&mut self) -> Result<Bytes> {
        if let Some(ministream) = &self.ministream {
            return Ok(ministream.clone());
        }

        let (start, size) = match self.entries[0].kind {
            EntryKind::Root { start_sector, size, .. } => (start_sector, size),
            // parse_directory guarantees the root shape
            _ => return Err(CfbError::InvalidFormat("no root entry".to_string())),
        };

        let mut data =
            fat::read_fat_chain(&mut self.source, &self.fat, self.header.sector_size, start)?;
        data.truncate(size as usize);

        let ministream = Bytes::from(data);
        self.ministream = Some(ministream.clone());
        Ok(ministream)
    }

    /// Decode the property set of every marked entry. Failures are
    /// isolated: the entry keeps its other fields and simply gains no
    /// properties.
    fn decode_property_sets(&mut self) {
        for id in 0..self.entries.len() {
            if !self.entries[id].is_property_stream {
                continue;
            }
            if let Ok(data) = self.read_entry_bytes(id as u32) {
                if let Ok(set) = parse_property_set(&data) {
                    self.entries[id].properties = Some(set);
                }
            }
        }
    }

    /// Read the bytes behind any stream-bearing entry, root included.
    fn read_entry_bytes(&mut self, id: u32) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(id as usize)
            .ok_or_else(|| CfbError::NoSuchStream(format!("directory entry {id}")))?;

        match entry.kind {
            EntryKind::Stream { .. } => self.read_stream(id),
            EntryKind::Root { start_sector, size, .. } => {
                let mut data = fat::read_fat_chain(
                    &mut self.source,
                    &self.fat,
                    self.header.sector_size,
                    start_sector,
                )?;
                data.truncate(size as usize);
                Ok(data)
            }
            EntryKind::Storage { .. } => Err(CfbError::NoSuchStream(format!(
                "directory entry {id} ({}) is not a stream",
                entry.name
            ))),
        }
    }
}

/// Check whether a byte buffer starts like a compound file.
pub fn is_cfb(data: &[u8]) -> bool {
    data.len() >= MINIMAL_FILE_SIZE && &data[0..8] == MAGIC
}
