//! Edit batch processing.
//!
//! One document change may carry several edits (multi-cursor, formatting).
//! Each edit is expressed in the coordinates left by the previous one, so
//! edits are applied in order to both the ranges and a private copy of the
//! document text.

use std::path::Path;

use log::debug;

use crate::adjust::{LineEdit, adjust};
use crate::range::Range;
use crate::text::DocumentText;

/// Result of processing one change event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOutcome {
    pub ranges: Vec<Range>,
    /// Whether any range of the edited file moved.
    pub changed: bool,
}

/// Run every edit of a change event against the ranges of `file_path`.
///
/// `document` is the file text before the first edit. Ranges of other
/// files are returned untouched.
pub fn process_change(
    file_path: &Path,
    document: &str,
    edits: &[LineEdit],
    mut ranges: Vec<Range>,
) -> BatchOutcome {
    let targets: Vec<usize> = ranges
        .iter()
        .enumerate()
        .filter(|(_, range)| range.belongs_to(file_path))
        .map(|(index, _)| index)
        .collect();

    if targets.is_empty() || edits.is_empty() {
        return BatchOutcome {
            ranges,
            changed: false,
        };
    }

    let mut text = DocumentText::new(document);
    let mut changed = false;

    for edit in edits {
        for &index in &targets {
            let range = &mut ranges[index];
            let adjustment = adjust(range, edit, &text);
            if adjustment.apply_to(range) {
                debug!(
                    target: "nvtx_ranges::batch",
                    "Range {} moved to {}..{}",
                    range.id,
                    range.start_line,
                    range.last_line()
                );
                changed = true;
            }
        }
        text.apply(edit);
    }

    BatchOutcome { ranges, changed }
}
