//! Directory stream parsing and tree assembly.
//!
//! The directory is a FAT chain of 128-byte entries. Entry 0 is the root
//! storage; every storage's children form a red/black tree threaded
//! through `left`/`right` indices, which is flattened here into a plain
//! children list.

use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

use crate::binary::{decode_utf16le, guid_is_null, parse_guid};
use crate::consts::*;
use crate::error::{CfbError, Result};
use crate::property::PropertySet;

/// On-disk directory entry layout (128 bytes).
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of the name in bytes, including the null terminator
    name_len: U16<LE>,
    /// Entry type byte (STGTY_*)
    entry_type: u8,
    /// Red/black flag; read but not re-validated
    color: u8,
    /// Left sibling index
    left: U32<LE>,
    /// Right sibling index
    right: U32<LE>,
    /// First child index (storages only)
    child: U32<LE>,
    /// Class id (16 bytes)
    class_id: [u8; 16],
    /// User flags
    state_bits: U32<LE>,
    /// Creation time (FILETIME)
    created: U64<LE>,
    /// Modification time (FILETIME)
    modified: U64<LE>,
    /// First sector of the stream
    start_sector: U32<LE>,
    /// Stream size in bytes
    size: U64<LE>,
}

/// What a directory entry is, with the fields that only make sense for
/// that shape of entry.
#[derive(Debug, Clone)]
pub enum EntryKind {
    /// A storage (folder). Carries no stream of its own.
    Storage {
        /// Canonical class id, when one is set
        class_id: Option<String>,
        /// User flags
        state_bits: u32,
        /// Creation FILETIME
        created: u64,
        /// Modification FILETIME
        modified: u64,
    },
    /// A stream (file).
    Stream {
        /// First sector, in the FAT or the mini FAT depending on size
        start_sector: u32,
        /// Exact byte length
        size: u64,
    },
    /// The root storage. Its stream is the mini stream backing all
    /// mini-sector data.
    Root {
        /// Canonical class id, when one is set
        class_id: Option<String>,
        /// First sector of the mini stream
        start_sector: u32,
        /// Byte length of the mini stream
        size: u64,
    },
}

/// A directory entry lifted off disk.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Index of this entry in the directory
    pub id: u32,
    /// Entry name, UTF-16LE decoded with control characters stripped
    pub name: String,
    /// Entry shape and shape-specific fields
    pub kind: EntryKind,
    /// Ids of child entries (storages and the root only)
    pub children: Vec<u32>,
    /// Decoded property set, for streams that carry one
    pub properties: Option<PropertySet>,
    pub(crate) left: u32,
    pub(crate) right: u32,
    pub(crate) child: u32,
    pub(crate) is_property_stream: bool,
}

impl DirEntry {
    /// True for stream entries.
    pub fn is_stream(&self) -> bool {
        matches!(self.kind, EntryKind::Stream { .. })
    }

    /// True for storages, including the root.
    pub fn is_storage(&self) -> bool {
        matches!(self.kind, EntryKind::Storage { .. } | EntryKind::Root { .. })
    }

    /// Byte length of the entry's stream; zero for plain storages.
    pub fn size(&self) -> u64 {
        match self.kind {
            EntryKind::Stream { size, .. } | EntryKind::Root { size, .. } => size,
            EntryKind::Storage { .. } => 0,
        }
    }

    pub(crate) fn start_sector(&self) -> u32 {
        match self.kind {
            EntryKind::Stream { start_sector, .. } | EntryKind::Root { start_sector, .. } => {
                start_sector
            }
            EntryKind::Storage { .. } => ENDOFCHAIN,
        }
    }
}

/// Parse the concatenated directory chain into a flat entry list.
///
/// Parsing stops at the first entry whose type byte is INVALID; the root
/// must appear at index 0 and valid cross-references only point at valid
/// entries.
pub(crate) fn parse_directory(data: &[u8], major_version: u16) -> Result<Vec<DirEntry>> {
    let mut entries = Vec::new();

    for (index, raw_bytes) in data.chunks_exact(DIRENTRY_SIZE).enumerate() {
        let raw = RawDirEntry::read_from_bytes(raw_bytes)
            .map_err(|_| CfbError::InvalidFormat("malformed directory entry".to_string()))?;

        if raw.entry_type == STGTY_INVALID {
            break;
        }

        entries.push(lift_entry(&raw, index as u32, major_version)?);
    }

    if entries.is_empty() {
        return Err(CfbError::InvalidFormat("empty directory".to_string()));
    }
    if !matches!(entries[0].kind, EntryKind::Root { .. }) {
        return Err(CfbError::InvalidFormat(
            "directory entry 0 is not the root storage".to_string(),
        ));
    }

    Ok(entries)
}

fn lift_entry(raw: &RawDirEntry, id: u32, major_version: u16) -> Result<DirEntry> {
    // The name length field counts bytes including the null terminator
    let name_len = (raw.name_len.get() as usize).saturating_sub(2).min(64);
    let name: String = decode_utf16le(&raw.name[..name_len])
        .chars()
        .filter(|&c| c >= '\u{20}')
        .collect();

    // Version 3 files only commit to the low half of the size field
    let size = if major_version == 3 {
        raw.size.get() & 0xFFFF_FFFF
    } else {
        raw.size.get()
    };

    let class_id = if guid_is_null(&raw.class_id) {
        None
    } else {
        Some(parse_guid(&raw.class_id)?)
    };

    let kind = match raw.entry_type {
        STGTY_STORAGE => EntryKind::Storage {
            class_id,
            state_bits: raw.state_bits.get(),
            created: raw.created.get(),
            modified: raw.modified.get(),
        },
        // ILockBytes and IPropertyStorage objects are stream-shaped
        STGTY_STREAM | STGTY_LOCKBYTES | STGTY_PROPERTY => EntryKind::Stream {
            start_sector: raw.start_sector.get(),
            size,
        },
        STGTY_ROOT => EntryKind::Root {
            class_id,
            start_sector: raw.start_sector.get(),
            size,
        },
        other => {
            return Err(CfbError::InvalidFormat(format!(
                "unknown directory entry type {other}"
            )))
        }
    };

    // A property-set stream announces itself with 0x05 as the first byte
    // of the on-disk record, i.e. the first unit of the name
    let is_property_stream = raw.name[0] == PROPERTY_STREAM_MARKER
        && raw.name[1] == 0
        && matches!(kind, EntryKind::Stream { .. } | EntryKind::Root { .. });

    Ok(DirEntry {
        id,
        name,
        kind,
        children: Vec::new(),
        properties: None,
        left: raw.left.get(),
        right: raw.right.get(),
        child: raw.child.get(),
        is_property_stream,
    })
}

/// Populate the `children` list of every storage by flattening its
/// sibling tree.
///
/// The walk is a worklist DFS over `left`/`right` starting at `child`,
/// guarded against NOSTREAM links, out-of-range ids and revisits so that
/// malformed files cannot loop it. Traversal order is not part of the
/// contract; callers wanting order sort by name.
pub(crate) fn lift_tree(entries: &mut [DirEntry]) {
    let n = entries.len();

    for index in 0..n {
        if !entries[index].is_storage() || entries[index].child == NOSTREAM {
            continue;
        }

        let mut children = Vec::new();
        let mut seen = vec![false; n];
        let mut work = vec![entries[index].child];

        while let Some(id) = work.pop() {
            let i = id as usize;
            if id > MAXREGSID || i >= n || seen[i] {
                continue;
            }
            seen[i] = true;

            if entries[i].left != NOSTREAM {
                work.push(entries[i].left);
            }
            if entries[i].right != NOSTREAM {
                work.push(entries[i].right);
            }
            children.push(id);
        }

        entries[index].children = children;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_entry(
        name: &str,
        entry_type: u8,
        left: u32,
        right: u32,
        child: u32,
        size: u64,
    ) -> Vec<u8> {
        let mut data = vec![0u8; DIRENTRY_SIZE];
        let units: Vec<u16> = name.encode_utf16().collect();
        for (i, unit) in units.iter().enumerate() {
            data[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        let name_len = (units.len() as u16 + 1) * 2;
        data[64..66].copy_from_slice(&name_len.to_le_bytes());
        data[66] = entry_type;
        data[67] = 1;
        data[68..72].copy_from_slice(&left.to_le_bytes());
        data[72..76].copy_from_slice(&right.to_le_bytes());
        data[76..80].copy_from_slice(&child.to_le_bytes());
        data[116..120].copy_from_slice(&0u32.to_le_bytes());
        data[120..128].copy_from_slice(&size.to_le_bytes());
        data
    }

    #[test]
    fn test_parse_stops_at_invalid() {
        let mut data = raw_entry("Root Entry", STGTY_ROOT, NOSTREAM, NOSTREAM, 1, 0);
        data.extend(raw_entry("A", STGTY_STREAM, NOSTREAM, NOSTREAM, NOSTREAM, 10));
        data.extend(vec![0u8; DIRENTRY_SIZE * 2]);
        let entries = parse_directory(&data, 3).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name, "A");
    }

    #[test]
    fn test_first_entry_must_be_root() {
        let data = raw_entry("A", STGTY_STREAM, NOSTREAM, NOSTREAM, NOSTREAM, 10);
        assert!(parse_directory(&data, 3).is_err());
    }

    #[test]
    fn test_name_strips_control_chars() {
        let mut data = raw_entry("Root Entry", STGTY_ROOT, NOSTREAM, NOSTREAM, 1, 0);
        data.extend(raw_entry(
            "\u{5}SummaryInformation",
            STGTY_STREAM,
            NOSTREAM,
            NOSTREAM,
            NOSTREAM,
            10,
        ));
        let entries = parse_directory(&data, 3).unwrap();
        assert_eq!(entries[1].name, "SummaryInformation");
        assert!(entries[1].is_property_stream);
    }

    #[test]
    fn test_version3_size_uses_low_half() {
        let mut data = raw_entry("Root Entry", STGTY_ROOT, NOSTREAM, NOSTREAM, 1, 0);
        data.extend(raw_entry(
            "S",
            STGTY_STREAM,
            NOSTREAM,
            NOSTREAM,
            NOSTREAM,
            0xDEAD_BEEF_0000_0064,
        ));
        let v3 = parse_directory(&data, 3).unwrap();
        assert_eq!(v3[1].size(), 0x64);
        let v4 = parse_directory(&data, 4).unwrap();
        assert_eq!(v4[1].size(), 0xDEAD_BEEF_0000_0064);
    }

    #[test]
    fn test_lift_tree_flattens_siblings() {
        // Root's children form the tree 2 <- 1 -> 3
        let mut data = raw_entry("Root Entry", STGTY_ROOT, NOSTREAM, NOSTREAM, 1, 0);
        data.extend(raw_entry("B", STGTY_STREAM, 2, 3, NOSTREAM, 1));
        data.extend(raw_entry("A", STGTY_STREAM, NOSTREAM, NOSTREAM, NOSTREAM, 1));
        data.extend(raw_entry("C", STGTY_STREAM, NOSTREAM, NOSTREAM, NOSTREAM, 1));
        let mut entries = parse_directory(&data, 3).unwrap();
        lift_tree(&mut entries);

        let mut children = entries[0].children.clone();
        children.sort_unstable();
        assert_eq!(children, vec![1, 2, 3]);
        assert!(entries[1].children.is_empty());
    }

    #[test]
    fn test_lift_tree_survives_cycles() {
        // Malformed: entries point at each other forever
        let mut data = raw_entry("Root Entry", STGTY_ROOT, NOSTREAM, NOSTREAM, 1, 0);
        data.extend(raw_entry("A", STGTY_STREAM, 2, NOSTREAM, NOSTREAM, 1));
        data.extend(raw_entry("B", STGTY_STREAM, 1, NOSTREAM, NOSTREAM, 1));
        let mut entries = parse_directory(&data, 3).unwrap();
        lift_tree(&mut entries);

        let mut children = entries[0].children.clone();
        children.sort_unstable();
        assert_eq!(children, vec![1, 2]);
    }
}
