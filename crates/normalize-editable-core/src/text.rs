//! Text helpers shared by the normalizer and DOM implementations.
//!
//! DOM offsets are counted in UTF-16 code units, matching the browser
//! `Range`/`Selection` APIs. These helpers convert between that and Rust's
//! UTF-8 byte indices.

/// Trim surrounding whitespace the way DOM text is trimmed.
///
/// Strips Unicode whitespace (including no-break space) and the byte-order
/// mark. Zero-width space (U+200B) is not whitespace and is kept, so a region
/// holding only the default placeholder does not trim to empty.
pub fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Length of a string in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Convert a UTF-16 offset into a byte index into `s`.
///
/// Returns `None` when the offset is past the end or splits a surrogate pair.
pub fn utf16_to_byte(s: &str, utf16_offset: usize) -> Option<usize> {
    let mut units = 0;
    for (byte_idx, ch) in s.char_indices() {
        if units == utf16_offset {
            return Some(byte_idx);
        }
        units += ch.len_utf16();
        if units > utf16_offset {
            return None;
        }
    }
    (units == utf16_offset).then_some(s.len())
}
