use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::BoardConfig;

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "taskhero.toml";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read and parse a config file.
pub fn read_config(path: &Path) -> Result<BoardConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the config for a session.
///
/// An explicitly requested file must exist. Without one, `taskhero.toml` in
/// `cwd` is used when present and defaults otherwise.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<BoardConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let default_path = cwd.join(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        read_config(&default_path)
    } else {
        Ok(BoardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_default_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, tmp.path()).unwrap();
        assert_eq!(config.board.status_message_secs, 3);
    }

    #[test]
    fn default_file_in_cwd_is_picked_up() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(DEFAULT_CONFIG_FILE),
            "[board]\npopup_percent = 60\n",
        )
        .unwrap();
        let config = load_config(None, tmp.path()).unwrap();
        assert_eq!(config.board.popup_percent, 60);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(Some(&tmp.path().join("other.toml")), tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[board\nstatus_message_secs = ").unwrap();
        assert!(matches!(
            read_config(&path).unwrap_err(),
            ConfigError::ParseError { .. }
        ));
    }
}
