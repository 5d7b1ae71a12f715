//! Property-set stream decoding.
//!
//! Streams whose name begins with the 0x05 marker carry an OLE property
//! set: a header naming a format id, then one section of typed
//! `(id, type, value)` items. SummaryInformation and
//! DocumentSummaryInformation are the two common instances.

use crate::binary::{
    parse_guid, read_f32_le, read_f64_le, read_i16_le, read_i32_le, read_u16_le, read_u32_le,
    read_u64_le,
};
use crate::codepage::decode_bytes;
use crate::consts::*;
use crate::error::{CfbError, Result};

/// A decoded property set: format identity plus its items in stream
/// order.
#[derive(Debug, Clone)]
pub struct PropertySet {
    /// Property set format version
    pub format_version: u16,
    /// Canonical format id (e.g. [`FMTID_SUMMARY`])
    pub format_id: String,
    /// Decoded items, in the order the section declares them
    pub items: Vec<PropertyItem>,
}

impl PropertySet {
    /// Look up an item's value by property id.
    pub fn get(&self, id: u32) -> Option<&PropertyValue> {
        self.items.iter().find(|item| item.id == id).map(|item| &item.value)
    }
}

/// One `(id, type, value)` item of a property set.
#[derive(Debug, Clone)]
pub struct PropertyItem {
    /// Property id (PID_* for the well-known formats)
    pub id: u32,
    /// Raw VT_* type tag as stored
    pub tag: u32,
    /// Decoded value
    pub value: PropertyValue,
}

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// VT_EMPTY / VT_NULL
    Null,
    /// VT_I1
    I1(i8),
    /// VT_I2
    I2(i16),
    /// VT_I4 / VT_INT
    I4(i32),
    /// VT_UI1
    U1(u8),
    /// VT_UI2
    U2(u16),
    /// VT_UI4 / VT_UINT
    U4(u32),
    /// VT_R4
    R4(f32),
    /// VT_R8
    R8(f64),
    /// VT_DATE: days since the 1899-12-30 automation epoch, kept raw.
    /// Use [`vt_date_to_unix_seconds`] for a Unix timestamp.
    Date(f64),
    /// VT_BSTR: raw bytes with the trailing NUL removed
    Bstr(Vec<u8>),
    /// VT_ERROR: an HRESULT
    ErrorCode(i32),
    /// VT_BOOL
    Bool(bool),
    /// VT_LPSTR: codepage-decoded text, trailing NULs stripped
    Lpstr(String),
    /// VT_LPWSTR: UTF-16LE decoded text
    Lpwstr(String),
    /// VT_FILETIME holding an absolute time: seconds since the Unix epoch
    Timestamp(i64),
    /// VT_FILETIME holding an elapsed time (PID_EDITTIME): whole seconds
    Duration(u64),
    /// VT_BLOB: raw bytes
    Blob(Vec<u8>),
    /// VT_CLSID: canonical GUID string
    Clsid(String),
}

/// Convert a VT_DATE day count to seconds since the Unix epoch.
pub fn vt_date_to_unix_seconds(days: f64) -> i64 {
    ((days - OLE_DATE_UNIX_DAYS) * 86400.0) as i64
}

/// Parse a property-set stream.
///
/// Only the first section is decoded; files may declare a second one.
/// Items with unknown type tags, or whose value runs past the buffer,
/// are dropped and the remaining items still decode. A declared item
/// count larger than the buffer can hold stops at the buffer edge.
pub(crate) fn parse_property_set(data: &[u8]) -> Result<PropertySet> {
    if data.len() < 48 {
        return Err(CfbError::InvalidFormat(
            "property stream too short".to_string(),
        ));
    }

    let byte_order = read_u16_le(data, 0)?;
    if byte_order != 0xFFFE {
        return Err(CfbError::InvalidFormat(format!(
            "property stream byte order mark {:#06X}",
            byte_order
        )));
    }
    let format_version = read_u16_le(data, 2)?;

    let section_count = read_u32_le(data, 24)?;
    if section_count == 0 {
        return Err(CfbError::InvalidFormat(
            "property stream declares no sections".to_string(),
        ));
    }

    let format_id = parse_guid(&data[28..44])?;
    let section_start = read_u32_le(data, 44)? as usize;

    if section_start + 8 > data.len() {
        return Err(CfbError::InvalidFormat(
            "property section offset out of bounds".to_string(),
        ));
    }

    let num_props = read_u32_le(data, section_start + 4)? as usize;

    // The codepage property governs LPSTR decoding for the whole set,
    // wherever it appears in the section
    let codepage = find_codepage(data, section_start, num_props);

    let mut items = Vec::new();
    for i in 0..num_props {
        let pair_offset = section_start + 8 + i * 8;
        let (id, value_offset) = match read_id_offset(data, pair_offset) {
            Some(pair) => pair,
            None => break,
        };

        let loc = section_start + value_offset;
        let tag = match read_u32_le(data, loc) {
            Ok(tag) => tag,
            Err(_) => continue,
        };

        if let Some(value) = parse_value(data, loc + 4, tag, id, codepage) {
            items.push(PropertyItem { id, tag, value });
        }
    }

    Ok(PropertySet {
        format_version,
        format_id,
        items,
    })
}

fn read_id_offset(data: &[u8], pair_offset: usize) -> Option<(u32, usize)> {
    let id = read_u32_le(data, pair_offset).ok()?;
    let offset = read_u32_le(data, pair_offset + 4).ok()?;
    Some((id, offset as usize))
}

/// Pre-scan the id/offset table for the codepage property.
fn find_codepage(data: &[u8], section_start: usize, num_props: usize) -> Option<u32> {
    for i in 0..num_props {
        let (id, value_offset) = read_id_offset(data, section_start + 8 + i * 8)?;
        if id != PID_CODEPAGE {
            continue;
        }
        let loc = section_start + value_offset;
        let tag = read_u32_le(data, loc).ok()?;
        let value = parse_value(data, loc + 4, tag, id, None)?;
        return codepage_from_value(&value);
    }
    None
}

/// Codepage number out of a decoded property value. The codepage
/// property shows up tagged VT_I2, VT_UI2, VT_I4 or VT_UI4 in the wild.
pub(crate) fn codepage_from_value(value: &PropertyValue) -> Option<u32> {
    match value {
        PropertyValue::I2(v) => Some(*v as u16 as u32),
        PropertyValue::U2(v) => Some(*v as u32),
        PropertyValue::I4(v) => Some(*v as u32),
        PropertyValue::U4(v) => Some(*v),
        _ => None,
    }
}

/// Decode one value. `None` means the item is dropped: unknown tag or a
/// value that runs past the buffer.
fn parse_value(
    data: &[u8],
    offset: usize,
    tag: u32,
    id: u32,
    codepage: Option<u32>,
) -> Option<PropertyValue> {
    match tag {
        VT_EMPTY | VT_NULL => Some(PropertyValue::Null),
        VT_I2 => read_i16_le(data, offset).ok().map(PropertyValue::I2),
        VT_I4 | VT_INT => read_i32_le(data, offset).ok().map(PropertyValue::I4),
        VT_R4 => read_f32_le(data, offset).ok().map(PropertyValue::R4),
        VT_R8 => read_f64_le(data, offset).ok().map(PropertyValue::R8),
        VT_DATE => read_f64_le(data, offset).ok().map(PropertyValue::Date),
        VT_BSTR => {
            let bytes = read_counted_bytes(data, offset)?;
            let trimmed = match bytes.split_last() {
                Some((&0, rest)) => rest.to_vec(),
                _ => bytes.to_vec(),
            };
            Some(PropertyValue::Bstr(trimmed))
        }
        VT_ERROR => read_i32_le(data, offset).ok().map(PropertyValue::ErrorCode),
        VT_BOOL => data.get(offset).map(|&b| PropertyValue::Bool(b != 0)),
        VT_I1 => data.get(offset).map(|&b| PropertyValue::I1(b as i8)),
        VT_UI1 => data.get(offset).map(|&b| PropertyValue::U1(b)),
        VT_UI2 => read_u16_le(data, offset).ok().map(PropertyValue::U2),
        VT_UI4 | VT_UINT => read_u32_le(data, offset).ok().map(PropertyValue::U4),
        VT_LPSTR => {
            let bytes = read_counted_bytes(data, offset)?;
            let text = decode_bytes(bytes, codepage)
                .unwrap_or_else(|| {
                    String::from_utf8_lossy(bytes)
                        .trim_end_matches('\0')
                        .to_string()
                });
            Some(PropertyValue::Lpstr(text))
        }
        VT_LPWSTR => {
            let unit_count = read_u32_le(data, offset).ok()? as usize;
            let byte_len = unit_count.checked_mul(2)?;
            if offset + 4 + byte_len > data.len() {
                return None;
            }
            let units: Vec<u16> = data[offset + 4..offset + 4 + byte_len]
                .chunks_exact(2)
                .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
                .take_while(|&unit| unit != 0)
                .collect();
            Some(PropertyValue::Lpwstr(String::from_utf16_lossy(&units)))
        }
        VT_FILETIME => {
            // Stored as u32 low then u32 high, which is just a LE u64
            let ticks = read_u64_le(data, offset).ok()?;
            if id == PID_EDITTIME {
                // Edit time is elapsed, not absolute
                Some(PropertyValue::Duration(ticks / FILETIME_TICKS_PER_SEC))
            } else {
                let unix =
                    (ticks as i64 - FILETIME_UNIX_OFFSET as i64) / FILETIME_TICKS_PER_SEC as i64;
                Some(PropertyValue::Timestamp(unix))
            }
        }
        VT_BLOB => {
            let bytes = read_counted_bytes(data, offset)?;
            Some(PropertyValue::Blob(bytes.to_vec()))
        }
        VT_CLSID => {
            if offset + 16 > data.len() {
                return None;
            }
            parse_guid(&data[offset..offset + 16])
                .ok()
                .map(PropertyValue::Clsid)
        }
        _ => None,
    }
}

/// Read a u32 count followed by that many bytes.
fn read_counted_bytes(data: &[u8], offset: usize) -> Option<&[u8]> {
    let count = read_u32_le(data, offset).ok()? as usize;
    if offset + 4 + count > data.len() {
        return None;
    }
    Some(&data[offset + 4..offset + 4 + count])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a single-section property stream with the given
    /// already-encoded values, laying out the id/offset table for them.
    fn property_stream(props: &[(u32, Vec<u8>)]) -> Vec<u8> {
        let section_start = 48usize;
        let mut data = Vec::new();
        data.extend_from_slice(&0xFFFEu16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]); // OS version
        data.extend_from_slice(&[0u8; 16]); // application CLSID
        data.extend_from_slice(&1u32.to_le_bytes()); // section count
        // SummaryInformation format id, on-disk layout
        data.extend_from_slice(&[
            0xE0, 0x85, 0x9F, 0xF2, 0xF9, 0x4F, 0x68, 0x10, 0xAB, 0x91, 0x08, 0x00, 0x2B, 0x27,
            0xB3, 0xD9,
        ]);
        data.extend_from_slice(&(section_start as u32).to_le_bytes());
        assert_eq!(data.len(), section_start);

        let table_len = 8 + props.len() * 8;
        let mut body = Vec::new();
        let mut table = Vec::new();
        table.extend_from_slice(&0u32.to_le_bytes()); // section size, unused
        table.extend_from_slice(&(props.len() as u32).to_le_bytes());
        for (id, encoded) in props {
            let value_offset = table_len + body.len();
            table.extend_from_slice(&id.to_le_bytes());
            table.extend_from_slice(&(value_offset as u32).to_le_bytes());
            body.extend_from_slice(encoded);
            while body.len() % 4 != 0 {
                body.push(0);
            }
        }

        data.extend_from_slice(&table);
        data.extend_from_slice(&body);
        data
    }

    fn encode(tag: u32, payload: &[u8]) -> Vec<u8> {
        let mut v = tag.to_le_bytes().to_vec();
        v.extend_from_slice(payload);
        v
    }

    #[test]
    fn test_scalar_values() {
        let data = property_stream(&[
            (100, encode(VT_I2, &(-7i16).to_le_bytes())),
            (101, encode(VT_I4, &123456i32.to_le_bytes())),
            (102, encode(VT_R8, &2.5f64.to_le_bytes())),
            (103, encode(VT_BOOL, &[1])),
            (104, encode(VT_UI4, &0xCAFEu32.to_le_bytes())),
        ]);
        let set = parse_property_set(&data).unwrap();
        assert_eq!(set.format_id, FMTID_SUMMARY);
        assert_eq!(set.get(100), Some(&PropertyValue::I2(-7)));
        assert_eq!(set.get(101), Some(&PropertyValue::I4(123456)));
        assert_eq!(set.get(102), Some(&PropertyValue::R8(2.5)));
        assert_eq!(set.get(103), Some(&PropertyValue::Bool(true)));
        assert_eq!(set.get(104), Some(&PropertyValue::U4(0xCAFE)));
    }

    #[test]
    fn test_lpstr_with_codepage() {
        let mut title = 6u32.to_le_bytes().to_vec();
        title.extend_from_slice(b"He\x93o\x94\x00");
        let data = property_stream(&[
            (PID_CODEPAGE, encode(VT_I2, &1252u16.to_le_bytes())),
            (PID_TITLE, encode(VT_LPSTR, &title)),
        ]);
        let set = parse_property_set(&data).unwrap();
        assert_eq!(
            set.get(PID_TITLE),
            Some(&PropertyValue::Lpstr("He\u{201C}o\u{201D}".to_string()))
        );
    }

    #[test]
    fn test_codepage_tagged_ui2() {
        let mut title = 6u32.to_le_bytes().to_vec();
        title.extend_from_slice(b"He\x93o\x94\x00");
        let data = property_stream(&[
            (PID_CODEPAGE, encode(VT_UI2, &1252u16.to_le_bytes())),
            (PID_TITLE, encode(VT_LPSTR, &title)),
        ]);
        let set = parse_property_set(&data).unwrap();
        assert_eq!(
            set.get(PID_CODEPAGE).and_then(codepage_from_value),
            Some(1252)
        );
        assert_eq!(
            set.get(PID_TITLE),
            Some(&PropertyValue::Lpstr("He\u{201C}o\u{201D}".to_string()))
        );
    }

    #[test]
    fn test_codepage_from_value_variants() {
        assert_eq!(codepage_from_value(&PropertyValue::I2(1252)), Some(1252));
        assert_eq!(codepage_from_value(&PropertyValue::U2(65001)), Some(65001));
        assert_eq!(codepage_from_value(&PropertyValue::I4(932)), Some(932));
        assert_eq!(codepage_from_value(&PropertyValue::U4(950)), Some(950));
        assert_eq!(codepage_from_value(&PropertyValue::Null), None);
    }

    #[test]
    fn test_large_property_counts_are_not_capped() {
        let props: Vec<(u32, Vec<u8>)> = (0..1500u32)
            .map(|i| (1000 + i, encode(VT_I4, &(i as i32).to_le_bytes())))
            .collect();
        let set = parse_property_set(&property_stream(&props)).unwrap();
        assert_eq!(set.items.len(), 1500);
        assert_eq!(set.get(2400), Some(&PropertyValue::I4(1400)));
    }

    #[test]
    fn test_lpwstr() {
        let mut payload = 6u32.to_le_bytes().to_vec();
        for unit in "Hello\0".encode_utf16() {
            payload.extend_from_slice(&unit.to_le_bytes());
        }
        let data = property_stream(&[(200, encode(VT_LPWSTR, &payload))]);
        let set = parse_property_set(&data).unwrap();
        assert_eq!(set.get(200), Some(&PropertyValue::Lpwstr("Hello".to_string())));
    }

    #[test]
    fn test_bstr_drops_trailing_nul() {
        let mut payload = 4u32.to_le_bytes().to_vec();
        payload.extend_from_slice(b"abc\x00");
        let data = property_stream(&[(201, encode(VT_BSTR, &payload))]);
        let set = parse_property_set(&data).unwrap();
        assert_eq!(set.get(201), Some(&PropertyValue::Bstr(b"abc".to_vec())));
    }

    #[test]
    fn test_blob_keeps_exact_count() {
        let mut payload = 3u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&[1, 0, 2]);
        let data = property_stream(&[(202, encode(VT_BLOB, &payload))]);
        let set = parse_property_set(&data).unwrap();
        assert_eq!(set.get(202), Some(&PropertyValue::Blob(vec![1, 0, 2])));
    }

    #[test]
    fn test_filetime_absolute_and_edit_time() {
        // 2020-01-01T00:00:00Z
        let ticks = (1_577_836_800u64 + 11_644_473_600) * FILETIME_TICKS_PER_SEC;
        let hour = 3600u64 * FILETIME_TICKS_PER_SEC;
        let data = property_stream(&[
            (PID_CREATE_DTM, encode(VT_FILETIME, &ticks.to_le_bytes())),
            (PID_EDITTIME, encode(VT_FILETIME, &hour.to_le_bytes())),
        ]);
        let set = parse_property_set(&data).unwrap();
        assert_eq!(
            set.get(PID_CREATE_DTM),
            Some(&PropertyValue::Timestamp(1_577_836_800))
        );
        assert_eq!(set.get(PID_EDITTIME), Some(&PropertyValue::Duration(3600)));
    }

    #[test]
    fn test_unknown_tag_is_skipped() {
        let data = property_stream(&[
            (300, encode(0x2003, &[0u8; 8])), // vector tag, unsupported
            (301, encode(VT_I4, &1i32.to_le_bytes())),
        ]);
        let set = parse_property_set(&data).unwrap();
        assert_eq!(set.get(300), None);
        assert_eq!(set.get(301), Some(&PropertyValue::I4(1)));
    }

    #[test]
    fn test_truncated_value_is_skipped() {
        // Count claims more bytes than the stream holds
        let mut payload = 100u32.to_le_bytes().to_vec();
        payload.extend_from_slice(b"short");
        let data = property_stream(&[
            (400, encode(VT_LPSTR, &payload)),
            (401, encode(VT_I2, &5i16.to_le_bytes())),
        ]);
        let set = parse_property_set(&data).unwrap();
        assert_eq!(set.get(400), None);
        assert_eq!(set.get(401), Some(&PropertyValue::I2(5)));
    }

    #[test]
    fn test_rejects_bad_byte_order() {
        let mut data = property_stream(&[]);
        data[0] = 0xFF;
        data[1] = 0xFF;
        assert!(parse_property_set(&data).is_err());
    }

    #[test]
    fn test_vt_date_conversion() {
        assert_eq!(vt_date_to_unix_seconds(25569.0), 0);
        assert_eq!(vt_date_to_unix_seconds(25570.5), 129600);
        // 2020-01-01 is 43831 days after the automation epoch
        assert_eq!(vt_date_to_unix_seconds(43831.0), 1_577_836_800);
    }
}
