//! Undo log for order mutations
//!
//! Captures a snapshot of an order before it is updated or deleted, keeps a
//! bounded number of those snapshots, and can reverse the most recent one.
//!
//! # Architecture
//!
//! - `UndoLog`: records, peeks, restores and clears backups
//! - `RetentionPolicy`: evicts the oldest records beyond the maximum depth
//! - `RestoreOutcome`: what a restore undid, plus any cleanup warning
//!
//! # Record lifecycle
//!
//! Every record starts out pending and ends exactly once, either evicted by
//! retention (oldest first) or consumed by a restore (newest first). Records
//! are never modified while pending.
//!
//! # Example
//!
//! ```rust,ignore
//! use order_undo::backup::UndoLog;
//! use order_undo::models::MutationAction;
//! use order_undo::storage::MemoryCollection;
//!
//! let backups = MemoryCollection::new();
//! let orders = MemoryCollection::new();
//! let log = UndoLog::new(&backups, &orders);
//!
//! log.record_mutation("A1", MutationAction::Delete, Some(snapshot), None, None)?;
//! // ... delete the order ...
//! let outcome = log.restore_latest()?;
//! println!("{}", outcome.summary());
//! ```

mod manager;
mod restore;
mod retention;

pub use manager::{UndoLog, DEFAULT_LOG_NAME};
pub use restore::RestoreOutcome;
pub use retention::RetentionPolicy;
