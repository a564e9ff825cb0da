//! Order service
//!
//! Reference gateway for mutating orders. Every update and delete first
//! records the order's pre-image in the undo log; a failed backup is logged
//! and never stops the mutation itself.

use serde_json::Value;

use crate::audit::{AuditEntry, AuditLogger};
use crate::backup::UndoLog;
use crate::error::{UndoError, UndoResult};
use crate::models::{BackupId, MutationAction};
use crate::storage::document::into_document;
use crate::storage::{DocumentId, DocumentStore, SortDirection, ID_FIELD};

/// Result of an update or delete made through the gateway
#[derive(Debug, Clone)]
pub struct OrderChange {
    /// The order after an update, or as it was before a delete
    pub order: Value,
    /// The backup protecting this change, if one could be recorded
    pub backup_id: Option<BackupId>,
}

/// Service for order mutations
pub struct OrderService<'a> {
    orders: &'a dyn DocumentStore,
    undo: &'a UndoLog<'a>,
    audit: &'a AuditLogger,
}

impl<'a> OrderService<'a> {
    pub fn new(orders: &'a dyn DocumentStore, undo: &'a UndoLog<'a>, audit: &'a AuditLogger) -> Self {
        Self {
            orders,
            undo,
            audit,
        }
    }

    /// Create a new order; an `_id` is assigned when the document has none
    pub fn create(&self, order: Value) -> UndoResult<DocumentId> {
        let doc = into_document(order)?;
        let id = self.orders.insert_one(doc)?;

        if let Some(created) = self.orders.find_by_id(&id)? {
            self.audit
                .record(&AuditEntry::create(id.as_str(), &Value::Object(created)));
        }

        Ok(id)
    }

    pub fn get(&self, id: &str) -> UndoResult<Option<Value>> {
        Ok(self
            .orders
            .find_by_id(&DocumentId::from(id))?
            .map(Value::Object))
    }

    /// All orders, sorted by id
    pub fn list(&self) -> UndoResult<Vec<Value>> {
        Ok(self
            .orders
            .find_sorted(ID_FIELD, SortDirection::Ascending, usize::MAX)?
            .into_iter()
            .map(Value::Object)
            .collect())
    }

    /// Set the given top-level fields on an order
    pub fn update(&self, id: &str, fields: Value) -> UndoResult<OrderChange> {
        let fields = into_document(fields)?;
        let doc_id = DocumentId::from(id);
        let before = self
            .orders
            .find_by_id(&doc_id)?
            .ok_or_else(|| UndoError::order_not_found(id))?;

        let mut after = before.clone();
        for (key, value) in fields {
            if key != ID_FIELD {
                after.insert(key, value);
            }
        }

        let before = Value::Object(before);
        let after_value = Value::Object(after.clone());
        let backup_id = self.backup(
            id,
            MutationAction::Update,
            &before,
            Some(after_value.clone()),
        );

        if !self.orders.replace_by_id(&doc_id, after)? {
            return Err(UndoError::order_not_found(id));
        }

        self.audit
            .record(&AuditEntry::update(id, &before, &after_value));

        Ok(OrderChange {
            order: after_value,
            backup_id,
        })
    }

    /// Delete an order
    pub fn delete(&self, id: &str) -> UndoResult<OrderChange> {
        let doc_id = DocumentId::from(id);
        let before = self
            .orders
            .find_by_id(&doc_id)?
            .map(Value::Object)
            .ok_or_else(|| UndoError::order_not_found(id))?;

        let backup_id = self.backup(id, MutationAction::Delete, &before, None);

        if !self.orders.delete_by_id(&doc_id)? {
            return Err(UndoError::order_not_found(id));
        }

        self.audit.record(&AuditEntry::delete(id, &before));

        Ok(OrderChange {
            order: before,
            backup_id,
        })
    }

    fn backup(
        &self,
        id: &str,
        action: MutationAction,
        before: &Value,
        after: Option<Value>,
    ) -> Option<BackupId> {
        match self
            .undo
            .record_mutation(id, action, Some(before.clone()), after, None)
        {
            Ok(backup_id) => Some(backup_id),
            Err(e) => match e.recorded_backup() {
                Some(backup_id) => {
                    tracing::warn!(order_id = id, %backup_id, error = %e, "backup recorded, retention failed");
                    Some(backup_id)
                }
                None => {
                    tracing::warn!(order_id = id, %action, error = %e, "failed to back up order");
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Document, MemoryCollection};
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        orders: MemoryCollection,
        backups: MemoryCollection,
        audit: AuditLogger,
        _temp: TempDir,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        Fixture {
            orders: MemoryCollection::new(),
            backups: MemoryCollection::new(),
            audit: AuditLogger::new(temp.path().join("audit.log")),
            _temp: temp,
        }
    }

    #[test]
    fn test_update_records_backup_then_mutates() {
        let f = fixture();
        let undo = UndoLog::new(&f.backups, &f.orders);
        let service = OrderService::new(&f.orders, &undo, &f.audit);

        service
            .create(json!({"_id": "A1", "name": "Alice", "total": 10}))
            .unwrap();
        let change = service.update("A1", json!({"total": 25})).unwrap();

        assert_eq!(change.order["total"], 25);
        assert_eq!(change.order["name"], "Alice");

        let backup = undo.peek_latest().unwrap();
        assert_eq!(Some(backup.id), change.backup_id);
        assert_eq!(backup.action, MutationAction::Update);
        assert_eq!(backup.previous_data["total"], 10);
        assert_eq!(backup.new_data.unwrap()["total"], 25);
    }

    #[test]
    fn test_delete_then_restore() {
        let f = fixture();
        let undo = UndoLog::new(&f.backups, &f.orders);
        let service = OrderService::new(&f.orders, &undo, &f.audit);

        service.create(json!({"_id": "A1", "name": "Alice"})).unwrap();
        service.delete("A1").unwrap();
        assert!(service.get("A1").unwrap().is_none());

        undo.restore_latest().unwrap();
        assert_eq!(service.get("A1").unwrap().unwrap()["name"], "Alice");
        assert_eq!(f.audit.read_recent(usize::MAX, None).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_order() {
        let f = fixture();
        let undo = UndoLog::new(&f.backups, &f.orders);
        let service = OrderService::new(&f.orders, &undo, &f.audit);

        assert!(service.delete("nope").unwrap_err().is_not_found());
        assert!(service.update("nope", json!({})).unwrap_err().is_not_found());
        assert_eq!(undo.count_backups().unwrap(), 0);
    }

    #[test]
    fn test_backup_failure_does_not_block_mutation() {
        struct Unavailable;

        impl DocumentStore for Unavailable {
            fn insert_one(&self, _: Document) -> UndoResult<DocumentId> {
                Err(UndoError::Persistence("backup store down".into()))
            }
            fn find_by_id(&self, _: &DocumentId) -> UndoResult<Option<Document>> {
                Ok(None)
            }
            fn find_sorted(&self, _: &str, _: SortDirection, _: usize) -> UndoResult<Vec<Document>> {
                Ok(Vec::new())
            }
            fn count(&self, _: &Document) -> UndoResult<usize> {
                Ok(0)
            }
            fn delete_by_ids(&self, _: &[DocumentId]) -> UndoResult<usize> {
                Ok(0)
            }
            fn delete_by_id(&self, _: &DocumentId) -> UndoResult<bool> {
                Ok(false)
            }
            fn delete_all(&self) -> UndoResult<usize> {
                Ok(0)
            }
            fn replace_by_id(&self, _: &DocumentId, _: Document) -> UndoResult<bool> {
                Ok(false)
            }
        }

        let f = fixture();
        let backups = Unavailable;
        let undo = UndoLog::new(&backups, &f.orders);
        let service = OrderService::new(&f.orders, &undo, &f.audit);

        service.create(json!({"_id": "A1"})).unwrap();
        let change = service.delete("A1").unwrap();

        assert!(change.backup_id.is_none());
        assert!(service.get("A1").unwrap().is_none());
    }

    #[test]
    fn test_retention_failure_keeps_backup_reference() {
        /// Backup collection that never evicts
        struct NoEviction(MemoryCollection);

        impl DocumentStore for NoEviction {
            fn insert_one(&self, doc: Document) -> UndoResult<DocumentId> {
                self.0.insert_one(doc)
            }
            fn find_by_id(&self, id: &DocumentId) -> UndoResult<Option<Document>> {
                self.0.find_by_id(id)
            }
            fn find_sorted(&self, field: &str, dir: SortDirection, limit: usize) -> UndoResult<Vec<Document>> {
                self.0.find_sorted(field, dir, limit)
            }
            fn count(&self, filter: &Document) -> UndoResult<usize> {
                self.0.count(filter)
            }
            fn delete_by_ids(&self, _: &[DocumentId]) -> UndoResult<usize> {
                Err(UndoError::Persistence("eviction refused".into()))
            }
            fn delete_by_id(&self, id: &DocumentId) -> UndoResult<bool> {
                self.0.delete_by_id(id)
            }
            fn delete_all(&self) -> UndoResult<usize> {
                self.0.delete_all()
            }
            fn replace_by_id(&self, id: &DocumentId, doc: Document) -> UndoResult<bool> {
                self.0.replace_by_id(id, doc)
            }
        }

        let f = fixture();
        let backups = NoEviction(MemoryCollection::new());
        let undo = UndoLog::new(&backups, &f.orders)
            .with_retention(crate::backup::RetentionPolicy::new(1));
        let service = OrderService::new(&f.orders, &undo, &f.audit);

        service.create(json!({"_id": "A1", "total": 1})).unwrap();
        service.update("A1", json!({"total": 2})).unwrap();
        let change = service.update("A1", json!({"total": 3})).unwrap();

        let latest = undo.peek_latest().unwrap();
        assert_eq!(change.backup_id, Some(latest.id));
        assert_eq!(latest.previous_data["total"], 2);

        undo.restore_latest().unwrap();
        assert_eq!(service.get("A1").unwrap().unwrap()["total"], 2);
    }

    #[test]
    fn test_list_sorted_by_id() {
        let f = fixture();
        let undo = UndoLog::new(&f.backups, &f.orders);
        let service = OrderService::new(&f.orders, &undo, &f.audit);

        for id in ["C3", "A1", "B2"] {
            service.create(json!({"_id": id})).unwrap();
        }

        let ids: Vec<_> = service
            .list()
            .unwrap()
            .into_iter()
            .map(|o| o["_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["A1", "B2", "C3"]);
    }
}
