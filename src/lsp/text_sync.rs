//! Text synchronization utilities for LSP didChange handling.
//!
//! Converts `TextDocumentContentChangeEvent` items into the `LineEdit`s the
//! range adjustment engine consumes.
//!
//! # Overview
//!
//! The LSP protocol supports two text synchronization modes:
//! - **Incremental**: Client sends only the changed ranges
//! - **Full**: Client sends the entire document content
//!
//! Incremental changes map one-to-one onto edits. A full replacement is
//! diffed against the previous text and reduced to one merged edit spanning
//! the first to the last changed character.

use similar::{ChangeTag, TextDiff};
use tower_lsp_server::ls_types::TextDocumentContentChangeEvent;

use crate::adjust::LineEdit;
use crate::text::DocumentText;

/// Apply content changes to text and build the matching line edits.
///
/// Edits are returned in the order the changes were applied; each one is
/// expressed in the coordinates left by the previous one.
///
/// # Returns
/// A tuple of:
/// - The updated text after applying all changes
/// - The line edits describing those changes (empty when nothing changed)
pub(crate) fn apply_content_changes_with_edits(
    old_text: &str,
    content_changes: Vec<TextDocumentContentChangeEvent>,
) -> (String, Vec<LineEdit>) {
    let mut document = DocumentText::new(old_text);
    let mut edits = Vec::new();

    for change in content_changes {
        if let Some(range) = change.range {
            let edit = LineEdit::new(
                range.start.line,
                range.start.character,
                range.end.line,
                range.end.character,
                change.text,
            );
            document.apply(&edit);
            edits.push(edit);
        } else {
            // Full document change - reconstruct what moved
            if let Some(edit) = reconstruct_merged_edit(&document, &change.text) {
                edits.push(edit);
            }
            document = DocumentText::new(change.text);
        }
    }

    (document.into_string(), edits)
}

/// Reconstruct a single merged edit from character-level diff.
///
/// Returns None if texts are identical.
fn reconstruct_merged_edit(old: &DocumentText, new_text: &str) -> Option<LineEdit> {
    let old_text = old.as_str();
    if old_text == new_text {
        return None;
    }

    // NOTE: from_chars() keeps column precision; from_lines() would turn every
    // change into whole-line replacements and defeat the at-start/at-end rules.
    let diff = TextDiff::from_chars(old_text, new_text);

    let mut first_change_start: Option<usize> = None;
    let mut last_old_end = 0;
    let mut last_new_end = 0;
    let mut old_byte = 0;
    let mut new_byte = 0;

    for change in diff.iter_all_changes() {
        let len = change.value().len();
        match change.tag() {
            ChangeTag::Equal => {
                old_byte += len;
                new_byte += len;
            }
            ChangeTag::Delete => {
                first_change_start.get_or_insert(old_byte);
                old_byte += len;
                last_old_end = old_byte;
                last_new_end = new_byte;
            }
            ChangeTag::Insert => {
                first_change_start.get_or_insert(old_byte);
                new_byte += len;
                last_old_end = old_byte;
                last_new_end = new_byte;
            }
        }
    }

    let start = first_change_start?;
    // Both texts share the prefix up to `start`, so it maps into the new text too.
    let inserted = new_text.get(start..last_new_end)?;
    let (start_line, start_character) = old.byte_to_position(start);
    let (end_line, end_character) = old.byte_to_position(last_old_end);

    Some(LineEdit::new(
        start_line,
        start_character,
        end_line,
        end_character,
        inserted,
    ))
}
