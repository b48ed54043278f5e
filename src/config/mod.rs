//! Settings persistence.
//!
//! One JSON document at `~/.config/kindling/settings.json`, read once at
//! startup and written wholesale on every change. Missing keys fall back
//! to defaults, so old settings files keep working after new fields are
//! added.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{FeedKind, SortOrder};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_view: FeedKind,
    pub default_sort: SortOrder,
    pub open_links_externally: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_view: FeedKind::Top,
            default_sort: SortOrder::Time,
            open_links_externally: false,
        }
    }
}

impl Settings {
    /// Load from the default path; a missing file is just the defaults.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the whole document back.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SettingsError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        fs::write(path, content).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `~/.config/kindling/settings.json`
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let config_dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(config_dir.join("kindling").join("settings.json"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write settings file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings.default_view, FeedKind::Top);
        assert_eq!(settings.default_sort, SortOrder::Time);
        assert!(!settings.open_links_externally);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings {
            default_view: FeedKind::Ask,
            default_sort: SortOrder::Score,
            open_links_externally: true,
        };
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.default_view, FeedKind::Ask);
        assert_eq!(loaded.default_sort, SortOrder::Score);
        assert!(loaded.open_links_externally);
    }

    #[test]
    fn test_missing_keys_are_backfilled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"default_view":"show"}"#).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.default_view, FeedKind::Show);
        assert_eq!(loaded.default_sort, SortOrder::Time);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
