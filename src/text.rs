//! Text manipulation utilities.
//!
//! This module provides utilities for working with document text:
//! - Position mapping between LSP (UTF-16) columns and byte offsets
//! - Per-line inspection used by the range adjustment engine
//! - An editable document buffer that applies line edits

mod document;
pub mod position;

pub use document::DocumentText;
pub use position::{
    compute_line_starts, convert_byte_to_utf16_in_line, convert_utf16_to_byte_in_line,
    first_non_whitespace_column, is_blank, text_after_column, trimmed_width,
};
