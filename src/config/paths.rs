//! Path management for order-undo
//!
//! Provides XDG-compliant path resolution for configuration and collections.
//!
//! ## Path Resolution Order
//!
//! 1. `ORDER_UNDO_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/order-undo` or `~/.config/order-undo`
//! 3. Windows: `%APPDATA%\order-undo`

use std::path::PathBuf;

use crate::error::UndoError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "ORDER_UNDO_DATA_DIR";

/// Manages all paths used by order-undo
#[derive(Debug, Clone)]
pub struct UndoPaths {
    base_dir: PathBuf,
}

impl UndoPaths {
    /// Resolve paths from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, UndoError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create UndoPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the collection files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// The protected order collection
    pub fn orders_file(&self) -> PathBuf {
        self.data_dir().join("orders.json")
    }

    /// The undo log collection
    pub fn backups_file(&self) -> PathBuf {
        self.data_dir().join("backups.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), UndoError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| UndoError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| UndoError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, UndoError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                UndoError::Config("HOME environment variable not set".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("order-undo"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, UndoError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| UndoError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("order-undo"))
}
