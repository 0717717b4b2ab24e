//! Code lenses shown above each range.

use serde_json::Value;
use tower_lsp_server::ls_types::{CodeLens, Command, Position, Range as LspRange};

use crate::config::WorkspaceSettings;
use crate::range::{Range, RangeKind};

use super::commands;

/// One lens per visible range, placed on its start line.
///
/// Clicking a lens toggles the range.
pub(crate) fn build_code_lenses(ranges: &[Range], settings: &WorkspaceSettings) -> Vec<CodeLens> {
    ranges
        .iter()
        .filter(|range| range.enabled || settings.show_disabled)
        .map(|range| {
            let line = range.start_line.saturating_sub(1);
            let position = Position::new(line, 0);
            CodeLens {
                range: LspRange::new(position, position),
                command: Some(Command {
                    title: lens_title(range),
                    command: commands::TOGGLE.to_string(),
                    arguments: Some(vec![Value::String(range.id.clone())]),
                }),
                data: None,
            }
        })
        .collect()
}

fn lens_title(range: &Range) -> String {
    let span = match (range.kind, range.end_line) {
        (RangeKind::Block, Some(end)) => format!("{}-{}", range.start_line, end),
        _ => range.start_line.to_string(),
    };
    let marker = match range.kind {
        RangeKind::Block => "NVTX range",
        RangeKind::Event => "NVTX mark",
    };
    if range.enabled {
        format!("{marker}: {} [{span}]", range.name)
    } else {
        format!("{marker}: {} [{span}] (disabled)", range.name)
    }
}
