//! Configuration module for order-undo
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence (retention depth, log name, log level)

pub mod paths;
pub mod settings;

pub use paths::UndoPaths;
pub use settings::{RetentionSettings, Settings};
