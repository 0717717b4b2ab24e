//! Validation of ranges that arrive from outside the process.

use serde::Serialize;

use super::model::{Range, RangeKind};

/// Outcome of validating a single range.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check the structural invariants of a range.
///
/// Internal mutations keep these invariants by clamping; this is for ranges
/// read from disk or received from a client.
pub fn validate(range: &Range) -> Validation {
    let mut errors = Vec::new();

    if range.id.trim().is_empty() {
        errors.push("id must not be empty".to_string());
    }
    if range.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if range.file_path.trim().is_empty() {
        errors.push("filePath must not be empty".to_string());
    }
    if range.start_line < 1 {
        errors.push(format!("startLine must be >= 1, got {}", range.start_line));
    }
    match (range.kind, range.end_line) {
        (RangeKind::Block, None) => {
            errors.push("block ranges require an endLine".to_string());
        }
        (RangeKind::Block, Some(end)) if end < range.start_line => {
            errors.push(format!(
                "endLine ({}) must be >= startLine ({})",
                end, range.start_line
            ));
        }
        (RangeKind::Event, Some(_)) => {
            errors.push("event ranges must not have an endLine".to_string());
        }
        _ => {}
    }

    Validation::from_errors(errors)
}
