//! Configuration file discovery and loading

use std::path::{Path, PathBuf};

use super::kestrel_config::Configuration;
use crate::error::KestrelError;
use crate::result::Result;

/// File names tried in each directory, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[".kestrel.toml", "kestrel.toml", "kestrel.json"];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover config file by traversing upward from start_path
    ///
    /// Tries [`CONFIG_FILE_NAMES`] in each directory, moving up until a
    /// config is found or the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| KestrelError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Configuration> {
        Configuration::load(path).map_err(|e| match e {
            KestrelError::ConfigError { message } => KestrelError::config_error(format!(
                "Failed to load config from '{}': {message}",
                path.display()
            )),
            other => other,
        })
    }

    /// Load config from path or auto-discover
    ///
    /// An explicit path must exist. Without one, discovery starts at
    /// `start_dir` (or the current directory) and falls back to the default
    /// configuration when nothing is found.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<Configuration> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(KestrelError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Configuration::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSeverity;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_file_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "kestrel.toml",
            r#"
            [linter]
            enabled = true

            [linter.rules]
            redundant_void_return = "error"
            "#,
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(config.linter.enabled, Some(true));
        assert_eq!(
            config.linter.rules["redundant_void_return"].severity(),
            Some(RuleSeverity::Error)
        );
    }

    #[test]
    fn test_load_from_file_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "kestrel.json",
            r#"{ "linter": { "recommended": false } }"#,
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(config.linter.recommended, Some(false));
    }

    #[test]
    fn test_auto_discover() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("Sources/App");
        fs::create_dir_all(&nested).unwrap();

        create_temp_config(temp_dir.path(), "kestrel.json", "{}");
        create_temp_config(temp_dir.path(), ".kestrel.toml", "");

        let found = ConfigLoader::auto_discover(&nested).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), ".kestrel.toml");
    }

    #[test]
    fn test_load_without_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load(None, Some(temp_dir.path())).unwrap();
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_invalid_content_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(temp_dir.path(), "kestrel.toml", "linter = 3");
        let err = ConfigLoader::load_from_file(&config_path).unwrap_err();
        assert!(matches!(err, KestrelError::ConfigError { .. }));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Some(Path::new("nonexistent.toml")), None);
        assert!(matches!(result, Err(KestrelError::ConfigError { .. })));
    }
}
