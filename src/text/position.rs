//! Line and column helpers.
//!
//! Columns follow the LSP default encoding: UTF-16 code units.

/// Compute line start offsets for efficient position mapping
pub fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut line_starts = vec![0];
    let mut offset = 0;

    for ch in text.chars() {
        offset += ch.len_utf8();
        if ch == '\n' {
            line_starts.push(offset);
        }
    }

    line_starts
}

/// Convert UTF-16 position to byte position within a line
/// Returns None if the UTF-16 position is beyond the end of the line
#[inline(always)]
pub fn convert_utf16_to_byte_in_line(line_text: &str, utf16_pos: usize) -> Option<usize> {
    let mut byte_offset = 0;
    let mut utf16_offset = 0;

    for ch in line_text.chars() {
        if utf16_offset >= utf16_pos {
            return Some(byte_offset);
        }
        utf16_offset += ch.len_utf16();
        byte_offset += ch.len_utf8();
    }

    if utf16_offset == utf16_pos {
        Some(byte_offset)
    } else {
        None
    }
}

/// Convert byte position to UTF-16 position within a line
/// Returns None if the byte position is invalid (e.g., in the middle of a multi-byte character)
#[inline(always)]
pub fn convert_byte_to_utf16_in_line(line_text: &str, byte_pos: usize) -> Option<usize> {
    let mut utf16_offset = 0;
    let mut byte_count = 0;

    for ch in line_text.chars() {
        if byte_count == byte_pos {
            return Some(utf16_offset);
        }
        let ch_bytes = ch.len_utf8();
        if byte_count + ch_bytes > byte_pos {
            return None;
        }
        byte_count += ch_bytes;
        utf16_offset += ch.len_utf16();
    }

    if byte_count == byte_pos {
        Some(utf16_offset)
    } else {
        None
    }
}

/// Whether a line holds only whitespace.
pub fn is_blank(line_text: &str) -> bool {
    line_text.trim().is_empty()
}

/// UTF-16 column of the first non-whitespace character, `None` for blank lines.
pub fn first_non_whitespace_column(line_text: &str) -> Option<u32> {
    let mut column = 0u32;
    for ch in line_text.chars() {
        if !ch.is_whitespace() {
            return Some(column);
        }
        column += ch.len_utf16() as u32;
    }
    None
}

/// UTF-16 width of the line once trailing whitespace is removed.
pub fn trimmed_width(line_text: &str) -> u32 {
    line_text
        .trim_end()
        .chars()
        .map(|ch| ch.len_utf16() as u32)
        .sum()
}

/// The part of the line from a UTF-16 column onwards (empty past the end).
pub fn text_after_column(line_text: &str, column: u32) -> &str {
    match convert_utf16_to_byte_in_line(line_text, column as usize) {
        Some(byte) => &line_text[byte..],
        None => "",
    }
}
