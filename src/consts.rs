/// Magic bytes at the beginning of every compound file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Size of the file header in bytes. Sector 0 starts right after it,
/// regardless of sector size.
pub const HEADER_SIZE: usize = 512;

/// Minimal size of an empty compound file with 512-byte sectors
pub const MINIMAL_FILE_SIZE: usize = 1536;

/// Size of a directory entry in bytes
pub const DIRENTRY_SIZE: usize = 128;

/// Number of FAT sector slots embedded in the header
pub const HEADER_FAT_SLOTS: usize = 109;

/// Offset of the embedded FAT sector list within the header
pub const HEADER_FAT_OFFSET: usize = 76;

// Sector numbers (SECTs)
/// Maximum regular sector number
pub const MAXREGSECT: u32 = 0xFFFFFFFA;
/// Denotes a DIFAT sector in a FAT
pub const DIFSECT: u32 = 0xFFFFFFFC;
/// Denotes a FAT sector in a FAT
pub const FATSECT: u32 = 0xFFFFFFFD;
/// End of a sector chain
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE;
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFFFFFF;

// Directory entry ids
/// Maximum regular directory entry id
pub const MAXREGSID: u32 = 0xFFFFFFFA;
/// Absent sibling or child link
pub const NOSTREAM: u32 = 0xFFFFFFFF;

// Object types in storage
/// Unallocated directory entry
pub const STGTY_INVALID: u8 = 0;
/// Element is a storage object
pub const STGTY_STORAGE: u8 = 1;
/// Element is a stream object
pub const STGTY_STREAM: u8 = 2;
/// Element is an ILockBytes object
pub const STGTY_LOCKBYTES: u8 = 3;
/// Element is an IPropertyStorage object
pub const STGTY_PROPERTY: u8 = 4;
/// Element is a root storage
pub const STGTY_ROOT: u8 = 5;

/// Marker byte: a stream whose name starts with this code point carries
/// a serialized property set
pub const PROPERTY_STREAM_MARKER: u8 = 0x05;

// Property value type tags (OLE VARIANT codes, stored as u32 in property sets)
pub const VT_EMPTY: u32 = 0;
pub const VT_NULL: u32 = 1;
pub const VT_I2: u32 = 2;
pub const VT_I4: u32 = 3;
pub const VT_R4: u32 = 4;
pub const VT_R8: u32 = 5;
pub const VT_CY: u32 = 6;
pub const VT_DATE: u32 = 7;
pub const VT_BSTR: u32 = 8;
pub const VT_ERROR: u32 = 10;
pub const VT_BOOL: u32 = 11;
pub const VT_I1: u32 = 16;
pub const VT_UI1: u32 = 17;
pub const VT_UI2: u32 = 18;
pub const VT_UI4: u32 = 19;
pub const VT_I8: u32 = 20;
pub const VT_UI8: u32 = 21;
pub const VT_INT: u32 = 22;
pub const VT_UINT: u32 = 23;
pub const VT_LPSTR: u32 = 30;
pub const VT_LPWSTR: u32 = 31;
pub const VT_FILETIME: u32 = 64;
pub const VT_BLOB: u32 = 65;
pub const VT_CLSID: u32 = 72;
pub const VT_VECTOR: u32 = 0x1000;

// Well-known property ids for the SummaryInformation format
pub const PID_CODEPAGE: u32 = 1;
pub const PID_TITLE: u32 = 2;
pub const PID_SUBJECT: u32 = 3;
pub const PID_AUTHOR: u32 = 4;
pub const PID_KEYWORDS: u32 = 5;
pub const PID_COMMENTS: u32 = 6;
pub const PID_TEMPLATE: u32 = 7;
pub const PID_LASTAUTHOR: u32 = 8;
pub const PID_REVNUMBER: u32 = 9;
pub const PID_EDITTIME: u32 = 10;
pub const PID_LASTPRINTED: u32 = 11;
pub const PID_CREATE_DTM: u32 = 12;
pub const PID_LASTSAVE_DTM: u32 = 13;
pub const PID_PAGECOUNT: u32 = 14;
pub const PID_WORDCOUNT: u32 = 15;
pub const PID_CHARCOUNT: u32 = 16;
pub const PID_APPNAME: u32 = 18;
pub const PID_SECURITY: u32 = 19;

// Well-known property ids for the DocumentSummaryInformation format
pub const PID_CATEGORY: u32 = 2;
pub const PID_MANAGER: u32 = 14;
pub const PID_COMPANY: u32 = 15;

/// Format id of the SummaryInformation property set (canonical form)
pub const FMTID_SUMMARY: &str = "F29F85E0-4FF9-1068-AB91-08002B27B3D9";

/// Format id of the DocumentSummaryInformation property set (canonical form)
pub const FMTID_DOCSUMMARY: &str = "D5CDD502-2E9C-101B-9397-08002B2CF9AE";

/// 100-ns ticks between 1601-01-01 (FILETIME epoch) and 1970-01-01 (Unix epoch)
pub const FILETIME_UNIX_OFFSET: u64 = 116_444_736_000_000_000;

/// FILETIME ticks per second
pub const FILETIME_TICKS_PER_SEC: u64 = 10_000_000;

/// Days between 1899-12-30 (OLE automation date epoch) and 1970-01-01
pub const OLE_DATE_UNIX_DAYS: f64 = 25569.0;
