//! Instrumentation plan export.
//!
//! Turns the enabled ranges into the per-file description the rewriting
//! tool consumes: statements to inject and context managers to wrap line
//! spans in. Nothing here touches source files.

use std::collections::BTreeMap;

use log::info;
use serde::Serialize;

use crate::error::{RangeError, RangeResult};
use crate::range::{Range, RangeKind};

/// Expressions used to render plan entries. `{name}` is replaced by the
/// range name, escaped for a single-quoted string literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanTemplates {
    pub context: String,
    pub event: String,
    pub preamble: String,
}

impl Default for PlanTemplates {
    fn default() -> Self {
        Self {
            context: "torch.cuda.nvtx.range('{name}')".to_string(),
            event: "torch.cuda.nvtx.mark('{name}')".to_string(),
            preamble: "import torch".to_string(),
        }
    }
}

impl PlanTemplates {
    fn render(template: &str, name: &str) -> String {
        template.replace("{name}", &escape_single_quoted(name))
    }
}

/// A statement injected next to a source line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InjectedEvent {
    pub line: u32,
    pub expr: String,
    /// Inject after the line instead of before it.
    pub post: bool,
}

/// A line span wrapped in a context manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRange {
    pub start_line: u32,
    pub end_line: u32,
    pub context: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilePlan {
    pub events: Vec<InjectedEvent>,
    pub ranges: Vec<ContextRange>,
}

/// Plan for every instrumented file, keyed by normalized path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstrumentationPlan {
    pub files: BTreeMap<String, FilePlan>,
}

impl InstrumentationPlan {
    pub fn range_count(&self) -> usize {
        self.files.values().map(|file| file.ranges.len()).sum()
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (path, file) in &self.files {
            for event in &file.events {
                if event.line == 0 {
                    errors.push(format!("{path}: event line must be positive"));
                }
                if event.expr.trim().is_empty() {
                    errors.push(format!("{path}:{}: expression cannot be empty", event.line));
                }
            }
            for range in &file.ranges {
                if range.start_line == 0 || range.end_line == 0 {
                    errors.push(format!("{path}: line numbers must be positive"));
                }
                if range.start_line > range.end_line {
                    errors.push(format!(
                        "{path}: start line ({}) cannot be greater than end line ({})",
                        range.start_line, range.end_line
                    ));
                }
                if range.context.trim().is_empty() {
                    errors.push(format!(
                        "{path}:{}: context expression cannot be empty",
                        range.start_line
                    ));
                }
            }
        }
        errors
    }
}

/// Build the plan for `ranges`. Disabled ranges are skipped.
pub fn build_plan(ranges: &[Range], templates: &PlanTemplates) -> RangeResult<InstrumentationPlan> {
    let mut plan = InstrumentationPlan::default();

    for range in ranges.iter().filter(|range| range.enabled) {
        let path = path_clean::clean(&range.file_path).display().to_string();
        let file = plan.files.entry(path).or_insert_with(|| FilePlan {
            events: vec![InjectedEvent {
                line: 1,
                expr: templates.preamble.clone(),
                post: false,
            }],
            ranges: Vec::new(),
        });

        match range.kind {
            RangeKind::Block => file.ranges.push(ContextRange {
                start_line: range.start_line,
                end_line: range.last_line(),
                context: PlanTemplates::render(&templates.context, &range.name),
                enabled: true,
            }),
            RangeKind::Event => file.events.push(InjectedEvent {
                line: range.start_line,
                expr: PlanTemplates::render(&templates.event, &range.name),
                post: true,
            }),
        }
    }

    for file in plan.files.values_mut() {
        file.ranges.sort_by_key(|range| range.start_line);
    }

    let errors = plan.validate();
    if !errors.is_empty() {
        return Err(RangeError::invalid(errors));
    }

    info!(
        target: "nvtx_ranges::plan",
        "Planned {} ranges across {} files",
        plan.range_count(),
        plan.files.len()
    );
    Ok(plan)
}

fn escape_single_quoted(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for ch in name.chars() {
        if matches!(ch, '\\' | '\'') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
