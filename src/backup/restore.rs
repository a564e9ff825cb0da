//! Restoring a backup onto the order store
//!
//! Applies a record's pre-mutation snapshot back onto the protected
//! collection. The snapshot is never interpreted: a deleted order is
//! reinserted as-is, an updated order has all of its fields replaced.

use serde::Serialize;

use crate::error::{UndoError, UndoResult};
use crate::models::{BackupId, BackupRecord, MutationAction};
use crate::storage::document::into_document;
use crate::storage::{DocumentId, DocumentStore};

/// Result of a restore operation
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    /// The record that was applied
    pub backup_id: BackupId,
    pub order_id: String,
    /// Which mutation was undone
    pub action: MutationAction,
    pub description: String,
    /// Identity of the reinserted document, for undone deletes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_document_id: Option<DocumentId>,
    /// Set when the snapshot was applied but the record could not be consumed
    ///
    /// The record is still in the log; restoring again would reapply it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_warning: Option<String>,
}

impl RestoreOutcome {
    pub(crate) fn new(record: &BackupRecord, restored_document_id: Option<DocumentId>) -> Self {
        Self {
            backup_id: record.id,
            order_id: record.order_id.clone(),
            action: record.action,
            description: record.description.clone(),
            restored_document_id,
            cleanup_warning: None,
        }
    }

    /// Whether the record was consumed cleanly
    pub fn is_clean(&self) -> bool {
        self.cleanup_warning.is_none()
    }

    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        let verb = match self.action {
            MutationAction::Delete => "Reinstated deleted",
            MutationAction::Update => "Reverted update to",
        };
        format!("{} order {} ({})", verb, self.order_id, self.description)
    }
}

/// Apply the record's snapshot to the target store
///
/// Leaves the target untouched and returns an error when the mutation cannot
/// be applied, so the record stays restorable.
pub(crate) fn apply_snapshot(
    target: &dyn DocumentStore,
    record: &BackupRecord,
) -> UndoResult<Option<DocumentId>> {
    let snapshot = into_document(record.previous_data.clone())?;

    match record.action {
        MutationAction::Delete => {
            let id = target.insert_one(snapshot)?;
            Ok(Some(id))
        }
        MutationAction::Update => {
            let order_id = DocumentId::new(record.order_id.as_str());
            if target.replace_by_id(&order_id, snapshot)? {
                Ok(None)
            } else {
                Err(UndoError::order_not_found(&record.order_id))
            }
        }
    }
}
