//! User configuration loading for nvtx-ranges.
//!
//! User config location: $XDG_CONFIG_HOME/nvtx-ranges/nvtx-ranges.toml
//! Fallback: the platform config directory (`dirs::config_dir()`).

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use super::CONFIG_FILE_NAME;
use super::settings::RangeConfig;

const APP_DIR: &str = "nvtx-ranges";

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub type UserConfigResult<T> = Result<T, UserConfigError>;

/// Returns the path to the user configuration file.
///
/// `$XDG_CONFIG_HOME` wins over the platform default so the location can be
/// redirected on every OS. Returns None if neither can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)?;
    Some(base.join(APP_DIR).join(CONFIG_FILE_NAME))
}

/// Load the user layer. A missing file is `Ok(None)`.
pub fn load_user_config() -> UserConfigResult<Option<RangeConfig>> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path).map_err(|source| UserConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&contents)
        .map(Some)
        .map_err(|source| UserConfigError::Parse { path, source })
}
