use crate::adjust::{LineEdit, LineSource};

use super::position::{compute_line_starts, convert_byte_to_utf16_in_line, convert_utf16_to_byte_in_line};

/// Editable document text with a line index.
///
/// Lines and columns are 0-indexed; columns are UTF-16 code units.
#[derive(Clone, Debug, Default)]
pub struct DocumentText {
    text: String,
    line_starts: Vec<usize>,
}

impl DocumentText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        Self { text, line_starts }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Number of lines; a trailing newline opens an empty last line.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Text of `line` without its terminator.
    pub fn line(&self, line: u32) -> Option<&str> {
        let start = *self.line_starts.get(line as usize)?;
        let end = self
            .line_starts
            .get(line as usize + 1)
            .copied()
            .unwrap_or(self.text.len());
        let raw = &self.text[start..end];
        let raw = raw.strip_suffix('\n').unwrap_or(raw);
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }

    /// Byte offset of a position, clamped to the document and line end.
    pub fn position_to_byte(&self, line: u32, character: u32) -> usize {
        let Some(&line_start) = self.line_starts.get(line as usize) else {
            return self.text.len();
        };
        let line_text = self.line(line).unwrap_or_default();
        let within = convert_utf16_to_byte_in_line(line_text, character as usize)
            .unwrap_or(line_text.len());
        line_start + within
    }

    /// Position of a byte offset. Offsets inside a multi-byte character
    /// resolve to the start of that character.
    pub fn byte_to_position(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let line_text = self.line(line as u32).unwrap_or_default();
        let mut within = (offset - self.line_starts[line]).min(line_text.len());
        while !line_text.is_char_boundary(within) {
            within -= 1;
        }
        let character = convert_byte_to_utf16_in_line(line_text, within).unwrap_or(0);
        (line as u32, character as u32)
    }

    /// Replace the span described by `edit` with its text.
    pub fn apply(&mut self, edit: &LineEdit) {
        let start = self.position_to_byte(edit.start_line, edit.start_character);
        let end = self
            .position_to_byte(edit.end_line, edit.end_character)
            .max(start);
        self.text.replace_range(start..end, &edit.text);
        self.line_starts = compute_line_starts(&self.text);
    }
}

impl LineSource for DocumentText {
    fn line_text(&self, line: u32) -> Option<&str> {
        self.line(line)
    }
}
