//! Core data models for order-undo
//!
//! The undo log only models its own records; the protected orders stay
//! opaque JSON documents.

pub mod backup;
pub mod ids;

pub use backup::{BackupRecord, MutationAction, NewBackup};
pub use ids::BackupId;
