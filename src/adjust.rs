//! Range adjustment engine.
//!
//! Given one text edit and one stored range, decide how the range's line
//! boundaries move so it keeps covering the same code. Edits and line
//! lookups are 0-indexed; stored ranges are 1-indexed and converted here.
//!
//! The engine only looks at line counts and at whitespace on the boundary
//! lines. It never fails: shifted boundaries are clamped back into the
//! `startLine >= 1`, `endLine >= startLine` invariants.

use crate::range::{Range, RangeKind};
use crate::text::{first_non_whitespace_column, is_blank, text_after_column, trimmed_width};

/// Read access to document lines as they were before the edit.
pub trait LineSource {
    /// Text of the 0-indexed `line` without its terminator.
    fn line_text(&self, line: u32) -> Option<&str>;
}

impl LineSource for [&str] {
    fn line_text(&self, line: u32) -> Option<&str> {
        self.get(line as usize).copied()
    }
}

impl LineSource for Vec<&str> {
    fn line_text(&self, line: u32) -> Option<&str> {
        self.as_slice().line_text(line)
    }
}

/// A single text replacement in pre-edit coordinates.
///
/// Lines are 0-indexed and characters are UTF-16 columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineEdit {
    pub start_line: u32,
    pub start_character: u32,
    pub end_line: u32,
    pub end_character: u32,
    pub text: String,
}

impl LineEdit {
    pub fn new(
        start_line: u32,
        start_character: u32,
        end_line: u32,
        end_character: u32,
        text: impl Into<String>,
    ) -> Self {
        Self {
            start_line,
            start_character,
            end_line,
            end_character,
            text: text.into(),
        }
    }

    /// Pure insertion at a position.
    pub fn insert(line: u32, character: u32, text: impl Into<String>) -> Self {
        Self::new(line, character, line, character, text)
    }

    pub fn inserted_newlines(&self) -> u32 {
        self.text.matches('\n').count() as u32
    }

    /// Newlines inserted minus lines removed.
    pub fn net_line_change(&self) -> i64 {
        let removed = self.end_line.saturating_sub(self.start_line);
        i64::from(self.inserted_newlines()) - i64::from(removed)
    }
}

/// Boundary movement computed for one range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    Unchanged,
    Shift { start_delta: i64, end_delta: i64 },
}

impl Adjustment {
    fn both(delta: i64) -> Self {
        Adjustment::Shift {
            start_delta: delta,
            end_delta: delta,
        }
    }

    fn end_only(delta: i64) -> Self {
        Adjustment::Shift {
            start_delta: 0,
            end_delta: delta,
        }
    }

    /// Apply to `range`, clamp, and report whether its lines moved.
    ///
    /// Events have no end line, so `end_delta` has no effect on them.
    /// `Unchanged` leaves the range untouched, malformed or not.
    pub fn apply_to(self, range: &mut Range) -> bool {
        let Adjustment::Shift {
            start_delta,
            end_delta,
        } = self
        else {
            return false;
        };

        let before = (range.start_line, range.end_line);
        range.start_line = shift_line(range.start_line, start_delta);
        if let Some(end) = range.end_line {
            range.end_line = Some(shift_line(end, end_delta));
        }
        range.clamp();
        (range.start_line, range.end_line) != before
    }
}

fn shift_line(line: u32, delta: i64) -> u32 {
    i64::from(line)
        .saturating_add(delta)
        .clamp(0, i64::from(u32::MAX)) as u32
}

/// Where an edit's start line falls relative to a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Above,
    AtStart,
    Inside,
    AtEnd,
    Below,
}

impl Placement {
    /// Classify `edit_line` against the 0-indexed span `start..=end`.
    pub fn classify(edit_line: u32, start: u32, end: u32) -> Self {
        if edit_line < start {
            Placement::Above
        } else if edit_line == start {
            Placement::AtStart
        } else if edit_line < end {
            Placement::Inside
        } else if edit_line == end {
            Placement::AtEnd
        } else {
            Placement::Below
        }
    }
}

/// Compute how `range` moves when `edit` is applied to `document`.
pub fn adjust<S>(range: &Range, edit: &LineEdit, document: &S) -> Adjustment
where
    S: LineSource + ?Sized,
{
    let net = edit.net_line_change();
    if net == 0 {
        return Adjustment::Unchanged;
    }

    let start = range.start_line.saturating_sub(1);
    let end = range.last_line().saturating_sub(1).max(start);

    match Placement::classify(edit.start_line, start, end) {
        Placement::Above => Adjustment::both(net),
        Placement::AtStart => at_start(range, edit, document, start, net),
        Placement::Inside => Adjustment::end_only(net),
        Placement::AtEnd => at_end(edit, document, net),
        Placement::Below => Adjustment::Unchanged,
    }
}

/// Edits before the first statement move the range; edits after it grow it.
fn at_start<S>(range: &Range, edit: &LineEdit, document: &S, start: u32, net: i64) -> Adjustment
where
    S: LineSource + ?Sized,
{
    let content_column = document
        .line_text(start)
        .and_then(first_non_whitespace_column);

    match content_column {
        Some(column) if edit.start_character > column => match range.kind {
            RangeKind::Block => Adjustment::end_only(net),
            RangeKind::Event => Adjustment::Unchanged,
        },
        _ => Adjustment::both(net),
    }
}

fn at_end<S>(edit: &LineEdit, document: &S, net: i64) -> Adjustment
where
    S: LineSource + ?Sized,
{
    let edit_line = document.line_text(edit.start_line).unwrap_or_default();

    if edit.inserted_newlines() > 0 && net > 0 {
        let remainder = document
            .line_text(edit.end_line)
            .map(|line| text_after_column(line, edit.end_character))
            .unwrap_or_default();
        let next_line = document.line_text(edit.end_line + 1).unwrap_or_default();
        let carries_code = edit.text.split('\n').skip(1).any(|line| !is_blank(line));

        if !is_blank(remainder) || !is_blank(next_line) || carries_code {
            Adjustment::end_only(net)
        } else {
            Adjustment::Unchanged
        }
    } else if edit.start_character < trimmed_width(edit_line) {
        Adjustment::end_only(net)
    } else {
        Adjustment::Unchanged
    }
}
