//! Codepage decoding for property-set strings.
//!
//! Codepage-tagged strings (VT_LPSTR values) are decoded through
//! `encoding_rs`. The codepage itself travels inside the property set as
//! the PID 1 property.

use encoding_rs::Encoding;

/// Decode bytes using the specified Windows codepage.
///
/// Trailing NUL terminators are stripped before decoding. Returns `None`
/// when the codepage is not supported.
#[inline]
pub fn decode_bytes(bytes: &[u8], codepage: Option<u32>) -> Option<String> {
    let bytes = strip_null_terminators(bytes);

    if bytes.is_empty() {
        return Some(String::new());
    }

    let encoding = codepage_to_encoding(codepage?)?;

    // encoding_rs guarantees valid UTF-8 output
    Some(encoding.decode(bytes).0.into_owned())
}

/// Strip NUL bytes from the end of a byte slice.
#[inline]
pub fn strip_null_terminators(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    &bytes[..end]
}

/// Map a Windows codepage identifier to an `encoding_rs` encoding.
///
/// Covers the codepages legacy Office property sets actually carry.
/// Returns `None` for unsupported identifiers.
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        // Windows codepages (Western scripts)
        874 => Some(encoding_rs::WINDOWS_874),   // Thai
        1250 => Some(encoding_rs::WINDOWS_1250), // Central European
        1251 => Some(encoding_rs::WINDOWS_1251), // Cyrillic
        1252 => Some(encoding_rs::WINDOWS_1252), // Western European (most common)
        1253 => Some(encoding_rs::WINDOWS_1253), // Greek
        1254 => Some(encoding_rs::WINDOWS_1254), // Turkish
        1255 => Some(encoding_rs::WINDOWS_1255), // Hebrew
        1256 => Some(encoding_rs::WINDOWS_1256), // Arabic
        1257 => Some(encoding_rs::WINDOWS_1257), // Baltic
        1258 => Some(encoding_rs::WINDOWS_1258), // Vietnamese

        // East Asian codepages
        932 => Some(encoding_rs::SHIFT_JIS), // Japanese Shift-JIS
        936 => Some(encoding_rs::GBK),       // Simplified Chinese
        949 => Some(encoding_rs::EUC_KR),    // Korean
        950 => Some(encoding_rs::BIG5),      // Traditional Chinese
        54936 => Some(encoding_rs::GB18030), // Chinese GB18030

        // ISO 8859 series
        28592 => Some(encoding_rs::ISO_8859_2),
        28595 => Some(encoding_rs::ISO_8859_5),
        28597 => Some(encoding_rs::ISO_8859_7),
        28605 => Some(encoding_rs::ISO_8859_15),

        // Macintosh
        10000 => Some(encoding_rs::MACINTOSH),

        // Unicode
        1200 => Some(encoding_rs::UTF_16LE),
        1201 => Some(encoding_rs::UTF_16BE),
        65001 => Some(encoding_rs::UTF_8),

        _ => None,
    }
}
