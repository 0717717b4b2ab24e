use serde::{Deserialize, Serialize};

use crate::plan::PlanTemplates;
use crate::store::DEFAULT_RANGES_FILE;

/// One configuration layer as written by the user.
///
/// Every field is optional so layers can be merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeConfig {
    /// Range file location, relative to the workspace root unless absolute.
    pub ranges_file: Option<String>,
    pub code_lens: Option<bool>,
    pub show_disabled: Option<bool>,
    pub context_template: Option<String>,
    pub event_template: Option<String>,
    pub preamble: Option<String>,
}

/// Fully resolved settings used by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSettings {
    pub ranges_file: String,
    pub code_lens: bool,
    pub show_disabled: bool,
    pub templates: PlanTemplates,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            ranges_file: DEFAULT_RANGES_FILE.to_string(),
            code_lens: true,
            show_disabled: true,
            templates: PlanTemplates::default(),
        }
    }
}
