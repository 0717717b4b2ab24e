pub mod defaults;
pub mod settings;
pub mod user;

pub use settings::{RangeConfig, WorkspaceSettings};
pub use user::{UserConfigError, UserConfigResult, load_user_config, user_config_path};

use crate::plan::PlanTemplates;

/// File name of both the project and the user configuration file.
pub const CONFIG_FILE_NAME: &str = "nvtx-ranges.toml";

/// Merge multiple RangeConfig layers in order.
/// Later configs in the slice have higher precedence (override earlier ones).
/// Use this for layered config: `merge_all(&[defaults, user, project, session])`
pub fn merge_all(configs: &[Option<RangeConfig>]) -> Option<RangeConfig> {
    configs.iter().cloned().reduce(merge_settings).flatten()
}

/// Merge two RangeConfig layers, preferring values from `primary` over `fallback`
pub fn merge_settings(
    fallback: Option<RangeConfig>,
    primary: Option<RangeConfig>,
) -> Option<RangeConfig> {
    match (fallback, primary) {
        (None, None) => None,
        (Some(settings), None) | (None, Some(settings)) => Some(settings),
        (Some(fallback), Some(primary)) => Some(RangeConfig {
            ranges_file: primary.ranges_file.or(fallback.ranges_file),
            code_lens: primary.code_lens.or(fallback.code_lens),
            show_disabled: primary.show_disabled.or(fallback.show_disabled),
            context_template: primary.context_template.or(fallback.context_template),
            event_template: primary.event_template.or(fallback.event_template),
            preamble: primary.preamble.or(fallback.preamble),
        }),
    }
}

impl From<&RangeConfig> for WorkspaceSettings {
    fn from(config: &RangeConfig) -> Self {
        let defaults = WorkspaceSettings::default();
        let templates = PlanTemplates {
            context: config
                .context_template
                .clone()
                .unwrap_or(defaults.templates.context),
            event: config
                .event_template
                .clone()
                .unwrap_or(defaults.templates.event),
            preamble: config
                .preamble
                .clone()
                .unwrap_or(defaults.templates.preamble),
        };

        WorkspaceSettings {
            ranges_file: config
                .ranges_file
                .clone()
                .filter(|path| !path.trim().is_empty())
                .unwrap_or(defaults.ranges_file),
            code_lens: config.code_lens.unwrap_or(defaults.code_lens),
            show_disabled: config.show_disabled.unwrap_or(defaults.show_disabled),
            templates,
        }
    }
}

impl From<RangeConfig> for WorkspaceSettings {
    fn from(config: RangeConfig) -> Self {
        WorkspaceSettings::from(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(ranges_file: Option<&str>, code_lens: Option<bool>) -> RangeConfig {
        RangeConfig {
            ranges_file: ranges_file.map(str::to_string),
            code_lens,
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_all_empty_slice_returns_none() {
        assert!(merge_all(&[]).is_none());
    }

    #[test]
    fn test_merge_all_scalar_later_wins() {
        let user = layer(Some("user.json"), Some(true));
        let project = layer(Some("project.json"), Some(false));

        let result = merge_all(&[Some(user), Some(project)]).unwrap();
        assert_eq!(result.ranges_file.as_deref(), Some("project.json"));
        assert_eq!(result.code_lens, Some(false));
    }

    #[test]
    fn test_merge_all_four_layers() {
        let defaults = defaults::default_settings();
        let user = layer(None, Some(false));
        let project = layer(Some("ranges/nvtx.json"), None);
        let session = RangeConfig {
            preamble: Some("import torch.cuda".into()),
            ..Default::default()
        };

        let merged = merge_all(&[Some(defaults), Some(user), None, Some(project), Some(session)]);
        let settings = WorkspaceSettings::from(merged.unwrap());

        assert_eq!(settings.ranges_file, "ranges/nvtx.json");
        assert!(!settings.code_lens);
        assert!(settings.show_disabled);
        assert_eq!(settings.templates.preamble, "import torch.cuda");
        assert_eq!(
            settings.templates.context,
            "torch.cuda.nvtx.range('{name}')"
        );
    }

    #[test]
    fn test_blank_ranges_file_falls_back_to_default() {
        let settings = WorkspaceSettings::from(layer(Some("  "), None));
        assert_eq!(settings.ranges_file, ".vscode/nvtx_ranges.json");
    }

    #[test]
    fn test_config_parses_camel_case_toml() {
        let config: RangeConfig = toml::from_str(
            r#"
            rangesFile = "profiling/ranges.json"
            showDisabled = false
            eventTemplate = "print('{name}')"
            "#,
        )
        .unwrap();
        assert_eq!(config.ranges_file.as_deref(), Some("profiling/ranges.json"));
        assert_eq!(config.show_disabled, Some(false));
        assert_eq!(config.event_template.as_deref(), Some("print('{name}')"));
        assert!(config.code_lens.is_none());
    }
}
