//! Administrative undo-log service
//!
//! Exposes count, restore and clear to an already-authorized caller, both
//! as typed results and as a flat success/error response.

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger};
use crate::backup::{RestoreOutcome, UndoLog};
use crate::error::UndoResult;
use crate::models::MutationAction;

/// Flat response for the administrative surface
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_action: Option<MutationAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl AdminResponse {
    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    fn with_count(count: usize) -> Self {
        Self {
            success: true,
            count: Some(count),
            ..Self::default()
        }
    }
}

/// Service for undo-log administration
pub struct AdminService<'a> {
    undo: &'a UndoLog<'a>,
    audit: &'a AuditLogger,
}

impl<'a> AdminService<'a> {
    pub fn new(undo: &'a UndoLog<'a>, audit: &'a AuditLogger) -> Self {
        Self { undo, audit }
    }

    pub fn count(&self) -> UndoResult<usize> {
        self.undo.count_backups()
    }

    /// Restore the newest backup and audit the result
    pub fn restore(&self) -> UndoResult<RestoreOutcome> {
        let outcome = self.undo.restore_latest()?;

        let mut detail = outcome.summary();
        if let Some(warning) = &outcome.cleanup_warning {
            detail.push_str(" - WARNING: ");
            detail.push_str(warning);
        }
        self.audit
            .record(&AuditEntry::restore(outcome.order_id.as_str(), detail));

        Ok(outcome)
    }

    /// Delete every backup and audit the reset
    pub fn clear(&self) -> UndoResult<usize> {
        let deleted = self.undo.clear_all()?;
        self.audit
            .record(&AuditEntry::clear(self.undo.log_name(), deleted));
        Ok(deleted)
    }

    pub fn get_backups_count(&self) -> AdminResponse {
        match self.count() {
            Ok(count) => AdminResponse::with_count(count),
            Err(e) => AdminResponse::failure(e),
        }
    }

    pub fn restore_last_backup(&self) -> AdminResponse {
        match self.restore() {
            Ok(outcome) => AdminResponse {
                success: true,
                restored_action: Some(outcome.action),
                warning: outcome.cleanup_warning,
                ..AdminResponse::default()
            },
            Err(e) => AdminResponse::failure(e),
        }
    }

    pub fn clear_all_backups(&self) -> AdminResponse {
        match self.clear() {
            Ok(deleted) => AdminResponse::with_count(deleted),
            Err(e) => AdminResponse::failure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::storage::{Document, DocumentStore, MemoryCollection};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_restore_on_empty_log() {
        let temp = TempDir::new().unwrap();
        let audit = AuditLogger::new(temp.path().join("audit.log"));
        let backups = MemoryCollection::new();
        let orders = MemoryCollection::new();
        let undo = UndoLog::new(&backups, &orders);
        let admin = AdminService::new(&undo, &audit);

        let response = admin.restore_last_backup();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": false, "error": "no backups available"})
        );
        assert!(audit.read_recent(usize::MAX, None).unwrap().is_empty());
    }

    #[test]
    fn test_restore_deleted_order() {
        let temp = TempDir::new().unwrap();
        let audit = AuditLogger::new(temp.path().join("audit.log"));
        let backups = MemoryCollection::new();
        let orders = MemoryCollection::new();
        let undo = UndoLog::new(&backups, &orders);
        let admin = AdminService::new(&undo, &audit);

        undo.record_mutation(
            "A1",
            crate::models::MutationAction::Delete,
            Some(json!({"name": "Alice"})),
            None,
            None,
        )
        .unwrap();

        let response = admin.restore_last_backup();
        assert!(response.success);
        assert_eq!(response.restored_action, Some(MutationAction::Delete));

        let alice = into_filter(json!({"name": "Alice"}));
        assert_eq!(orders.count(&alice).unwrap(), 1);
        assert_eq!(admin.get_backups_count().count, Some(0));

        let entries = audit.read_recent(usize::MAX, None).unwrap();
        assert_eq!(entries[0].operation, Operation::Restore);
    }

    #[test]
    fn test_clear_all_backups() {
        let temp = TempDir::new().unwrap();
        let audit = AuditLogger::new(temp.path().join("audit.log"));
        let backups = MemoryCollection::new();
        let orders = MemoryCollection::new();
        let undo = UndoLog::new(&backups, &orders);
        let admin = AdminService::new(&undo, &audit);

        for n in 0..7 {
            undo.record_mutation(
                "A1",
                MutationAction::Update,
                Some(json!({"n": n})),
                None,
                None,
            )
            .unwrap();
        }

        let response = admin.clear_all_backups();
        assert!(response.success);
        assert_eq!(response.count, Some(7));
        assert_eq!(admin.get_backups_count().count, Some(0));
        assert!(!admin.restore_last_backup().success);
    }

    fn into_filter(value: serde_json::Value) -> Document {
        crate::storage::document::into_document(value).unwrap()
    }
}
