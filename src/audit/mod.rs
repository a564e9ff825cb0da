//! Audit trail for order-undo
//!
//! Records order mutations made through the gateway and administrative
//! undo-log actions in an append-only JSONL file.
//!
//! - `AuditEntry`: one timestamped operation with optional before/after values
//! - `AuditLogger`: appends entries and reads them back

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
