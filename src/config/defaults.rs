//! Programmed defaults, the lowest configuration layer.

use super::settings::RangeConfig;
use crate::plan::PlanTemplates;
use crate::store::DEFAULT_RANGES_FILE;

/// Returns the default layer with every field filled in.
pub fn default_settings() -> RangeConfig {
    let templates = PlanTemplates::default();
    RangeConfig {
        ranges_file: Some(DEFAULT_RANGES_FILE.to_string()),
        code_lens: Some(true),
        show_disabled: Some(true),
        context_template: Some(templates.context),
        event_template: Some(templates.event),
        preamble: Some(templates.preamble),
    }
}
