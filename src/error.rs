//! Error type for compound file parsing.

use thiserror::Error;

/// Main error type for longan operations.
#[derive(Error, Debug)]
pub enum CfbError {
    /// IO error from the underlying byte source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Not a compound file, or a structurally invalid one
    #[error("invalid compound file: {0}")]
    InvalidFormat(String),

    /// Unsupported combination of format version and sector size
    #[error("unsupported format: version {major} with {sector_size}-byte sectors")]
    VersionMismatch {
        /// Major format version from the header
        major: u16,
        /// Sector size derived from the header's sector shift
        sector_size: usize,
    },

    /// A sector chain walked past the end of its allocation table,
    /// or ended before the declared stream size was satisfied
    #[error("sector chain truncated at sector {0:#010X}")]
    Truncated(u32),

    /// The requested directory entry does not exist or is not a stream
    #[error("no such stream: {0}")]
    NoSuchStream(String),
}

/// Result type for longan operations.
pub type Result<T> = std::result::Result<T, CfbError>;
