//! Audit entry data structures
//!
//! Defines the operations and entities the audit trail records and the
//! entry format itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Order was created
    Create,
    /// Order was updated
    Update,
    /// Order was deleted
    Delete,
    /// A backup was restored onto the order store
    Restore,
    /// The undo log was reset
    Clear,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Restore => write!(f, "RESTORE"),
            Operation::Clear => write!(f, "CLEAR"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Order,
    UndoLog,
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    /// Order id, or the log name for undo-log operations
    pub entity_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    /// Free-form detail, e.g. a restore summary or warning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditEntry {
    fn new(operation: Operation, entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            before: None,
            after: None,
            detail: None,
        }
    }

    /// Entry for a created order
    pub fn create(order_id: impl Into<String>, after: &Value) -> Self {
        Self {
            after: Some(after.clone()),
            ..Self::new(Operation::Create, EntityType::Order, order_id)
        }
    }

    /// Entry for an updated order
    pub fn update(order_id: impl Into<String>, before: &Value, after: &Value) -> Self {
        Self {
            before: Some(before.clone()),
            after: Some(after.clone()),
            ..Self::new(Operation::Update, EntityType::Order, order_id)
        }
    }

    /// Entry for a deleted order
    pub fn delete(order_id: impl Into<String>, before: &Value) -> Self {
        Self {
            before: Some(before.clone()),
            ..Self::new(Operation::Delete, EntityType::Order, order_id)
        }
    }

    /// Entry for a restore applied to an order
    pub fn restore(order_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(Operation::Restore, EntityType::Order, order_id)
        }
    }

    /// Entry for an undo log reset
    pub fn clear(log_name: impl Into<String>, deleted: usize) -> Self {
        Self {
            detail: Some(format!("{} backup(s) deleted", deleted)),
            ..Self::new(Operation::Clear, EntityType::UndoLog, log_name)
        }
    }

    /// One-line human-readable form
    pub fn format_human_readable(&self) -> String {
        let mut line = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation,
            match self.entity_type {
                EntityType::Order => "order",
                EntityType::UndoLog => "undo-log",
            },
            self.entity_id
        );
        if let Some(detail) = &self.detail {
            line.push_str(": ");
            line.push_str(detail);
        }
        line
    }
}
