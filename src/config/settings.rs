//! User settings for order-undo
//!
//! Manages the retention depth of the undo log, the name of the logical log
//! used for restore serialization, and the default log verbosity.

use serde::{Deserialize, Serialize};

use super::paths::UndoPaths;
use crate::error::UndoError;

/// Number of backups kept when nothing else is configured
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Undo log retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionSettings {
    /// Maximum number of backups retained after each push
    pub max_depth: usize,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// User settings for order-undo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub retention: RetentionSettings,

    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Name of the logical undo log; restores of the same name are serialized
    #[serde(default = "default_log_name")]
    pub log_name: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_name() -> String {
    "orders".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            retention: RetentionSettings::default(),
            log_level: default_log_level(),
            log_name: default_log_name(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &UndoPaths) -> Result<Self, UndoError> {
        let settings_path = paths.settings_file();

        let settings = if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| UndoError::Io(format!("Failed to read settings file: {}", e)))?;

            serde_json::from_str(&contents)
                .map_err(|e| UndoError::Config(format!("Failed to parse settings file: {}", e)))?
        } else {
            // Don't save yet - let caller decide when to persist
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the undo log cannot operate with
    pub fn validate(&self) -> Result<(), UndoError> {
        if self.retention.max_depth == 0 {
            return Err(UndoError::Config(
                "retention.max_depth must be at least 1".into(),
            ));
        }
        if self.log_name.trim().is_empty() {
            return Err(UndoError::Config("log_name cannot be empty".into()));
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &UndoPaths) -> Result<(), UndoError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| UndoError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| UndoError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
