use std::path::{Path, PathBuf};

use tracing::info;

use crate::app_dirs;

use super::{CONFIG_FILE_NAME, ClassifierSettings, ConfigError};

/// Resolve the settings file path, ensuring the app directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from the app directory, returning defaults if missing.
pub fn load_or_default() -> Result<ClassifierSettings, ConfigError> {
    load_from_path(&config_path()?)
}

/// Load and validate settings from `path`.
///
/// A missing file yields defaults. Relative model and mapping paths are
/// resolved against the directory holding the file.
pub fn load_from_path(path: &Path) -> Result<ClassifierSettings, ConfigError> {
    let mut settings = if path.exists() {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: ClassifierSettings =
            toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
                path: path.to_path_buf(),
                source,
            })?;
        info!("Loaded classifier settings from {}", path.display());
        settings
    } else {
        ClassifierSettings::default()
    };
    if let Some(base) = path.parent() {
        settings.resolve_paths(base);
    }
    settings.validate()?;
    Ok(settings)
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
