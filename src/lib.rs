//! order-undo - bounded undo log for order mutations
//!
//! Before an order is updated or deleted, a snapshot of its previous state is
//! recorded in a bounded, time-ordered undo log. An operator can later
//! reverse the single most recent recorded mutation.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Backup records and identifiers
//! - `storage`: Document-store contract, JSON-file and in-memory collections
//! - `backup`: The undo log, retention policy and restore logic
//! - `services`: Order gateway and administrative surface
//! - `audit`: Audit trail of mutations and admin actions
//! - `display`, `cli`: Terminal front end
//!
//! # Example
//!
//! ```rust,ignore
//! use order_undo::backup::UndoLog;
//! use order_undo::config::{paths::UndoPaths, settings::Settings};
//! use order_undo::storage::Storage;
//!
//! let paths = UndoPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! let undo = UndoLog::from_settings(&storage, &settings);
//! let outcome = undo.restore_latest()?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{UndoError, UndoResult};
