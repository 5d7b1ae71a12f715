//! Bounds-checked little-endian readers over byte buffers.
//!
//! Every multi-byte field in a compound file is little-endian. These
//! helpers decode fixed-width values at arbitrary offsets and handle the
//! two text shapes the format uses: UTF-16LE names and mixed-endian GUIDs.

use crate::error::{CfbError, Result};
use zerocopy::{FromBytes, F32, F64, I16, I32, LE, U16, U32, U64};

/// Read a little-endian u16 from a byte slice at the given offset.
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16> {
    if offset + 2 > data.len() {
        return Err(CfbError::InvalidFormat("not enough data for u16".to_string()));
    }
    U16::<LE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .map_err(|_| CfbError::InvalidFormat("failed to read u16".to_string()))
}

/// Read a little-endian i16 from a byte slice at the given offset.
#[inline]
pub fn read_i16_le(data: &[u8], offset: usize) -> Result<i16> {
    if offset + 2 > data.len() {
        return Err(CfbError::InvalidFormat("not enough data for i16".to_string()));
    }
    I16::<LE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .map_err(|_| CfbError::InvalidFormat("failed to read i16".to_string()))
}

/// Read a little-endian u32 from a byte slice at the given offset.
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    if offset + 4 > data.len() {
        return Err(CfbError::InvalidFormat("not enough data for u32".to_string()));
    }
    U32::<LE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| CfbError::InvalidFormat("failed to read u32".to_string()))
}

/// Read a little-endian i32 from a byte slice at the given offset.
#[inline]
pub fn read_i32_le(data: &[u8], offset: usize) -> Result<i32> {
    if offset + 4 > data.len() {
        return Err(CfbError::InvalidFormat("not enough data for i32".to_string()));
    }
    I32::<LE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| CfbError::InvalidFormat("failed to read i32".to_string()))
}

/// Read a little-endian u64 from a byte slice at the given offset.
#[inline]
pub fn read_u64_le(data: &[u8], offset: usize) -> Result<u64> {
    if offset + 8 > data.len() {
        return Err(CfbError::InvalidFormat("not enough data for u64".to_string()));
    }
    U64::<LE>::read_from_bytes(&data[offset..offset + 8])
        .map(|v| v.get())
        .map_err(|_| CfbError::InvalidFormat("failed to read u64".to_string()))
}

/// Read a little-endian f32 from a byte slice at the given offset.
#[inline]
pub fn read_f32_le(data: &[u8], offset: usize) -> Result<f32> {
    if offset + 4 > data.len() {
        return Err(CfbError::InvalidFormat("not enough data for f32".to_string()));
    }
    F32::<LE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| CfbError::InvalidFormat("failed to read f32".to_string()))
}

/// Read a little-endian f64 from a byte slice at the given offset.
#[inline]
pub fn read_f64_le(data: &[u8], offset: usize) -> Result<f64> {
    if offset + 8 > data.len() {
        return Err(CfbError::InvalidFormat("not enough data for f64".to_string()));
    }
    F64::<LE>::read_from_bytes(&data[offset..offset + 8])
        .map(|v| v.get())
        .map_err(|_| CfbError::InvalidFormat("failed to read f64".to_string()))
}

/// Decode UTF-16LE bytes into a String.
///
/// Invalid sequences are replaced with U+FFFD; decoding stops at the first
/// NUL code unit.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let utf16_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .take_while(|&unit| unit != 0)
        .collect();

    String::from_utf16_lossy(&utf16_units)
}

/// Parse a 16-byte GUID into its canonical string form.
///
/// The first three groups are stored little-endian on disk and are
/// byte-swapped here; the trailing 8 bytes are kept in source order. This
/// is the only place the swap lives; both class ids and property-set
/// format ids go through it.
pub fn parse_guid(bytes: &[u8]) -> Result<String> {
    if bytes.len() < 16 {
        return Err(CfbError::InvalidFormat("not enough data for GUID".to_string()));
    }

    Ok(format!(
        "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        read_u32_le(bytes, 0)?,
        read_u16_le(bytes, 4)?,
        read_u16_le(bytes, 6)?,
        bytes[8],
        bytes[9],
        bytes[10],
        bytes[11],
        bytes[12],
        bytes[13],
        bytes[14],
        bytes[15],
    ))
}

/// True when all 16 GUID bytes are zero.
#[inline]
pub fn guid_is_null(bytes: &[u8]) -> bool {
    bytes.iter().take(16).all(|&b| b == 0)
}
