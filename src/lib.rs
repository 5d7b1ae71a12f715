//! Longan - a reader for Microsoft Compound File Binary (CFB / OLE2)
//! structured storage.
//!
//! A compound file is a miniature filesystem packed into a single byte
//! stream: legacy Office documents (.doc, .xls, .ppt) and many other
//! Windows composite files use it as their container. This crate parses
//! that container, strictly read-only:
//!
//! - **Header and allocation tables**: FAT, DIFAT extension, mini FAT
//! - **Directory tree**: named storages and streams, lifted off the
//!   on-disk red/black sibling trees
//! - **Stream reading**: lazy, chunked reconstruction across fragmented
//!   sector chains, large streams through the FAT and small ones through
//!   the mini stream
//! - **Property sets**: SummaryInformation-style typed metadata decoded
//!   into `(id, type, value)` items
//!
//! # Example - listing streams
//!
//! ```no_run
//! use longan::CompoundFile;
//!
//! # fn main() -> longan::Result<()> {
//! let cfb = CompoundFile::open_path("document.doc")?;
//!
//! for path in cfb.list_streams() {
//!     println!("{}", path.join("/"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - reading a stream in chunks
//!
//! ```no_run
//! use longan::CompoundFile;
//!
//! # fn main() -> longan::Result<()> {
//! let mut cfb = CompoundFile::open_path("document.doc")?;
//! let id = cfb.find_stream("WordDocument").expect("not a Word file");
//!
//! let mut total = 0;
//! for chunk in cfb.stream(id)? {
//!     total += chunk?.len();
//! }
//! println!("{total} bytes");
//! # Ok(())
//! # }
//! ```
//!
//! # Example - document metadata
//!
//! ```no_run
//! use longan::{CompoundFile, Metadata};
//!
//! # fn main() -> longan::Result<()> {
//! let cfb = CompoundFile::open_path("document.doc")?;
//! let meta = Metadata::from_file(&cfb);
//! println!("title: {:?}, author: {:?}", meta.title, meta.author);
//! # Ok(())
//! # }
//! ```

/// Format constants: magic bytes, sector sentinels, entry types,
/// property type tags and well-known property ids
pub mod consts;

mod binary;
mod codepage;
mod directory;
mod error;
mod fat;
mod file;
mod header;
mod metadata;
mod property;
mod source;
mod stream;


pub use codepage::{codepage_to_encoding, decode_bytes};
pub use directory::{DirEntry, EntryKind};
pub use error::{CfbError, Result};
pub use file::{is_cfb, CompoundFile};
pub use header::Header;
pub use metadata::Metadata;
pub use property::{vt_date_to_unix_seconds, PropertyItem, PropertySet, PropertyValue};
pub use stream::StreamChunks;
