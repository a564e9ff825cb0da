//! Backup record persistence
//!
//! Thin typed layer over a document collection holding the undo log. It has
//! no business logic and keeps no state of its own.

use serde_json::Value;

use super::document::{Document, DocumentId, SortDirection, ID_FIELD};
use super::DocumentStore;
use crate::error::{UndoError, UndoResult};
use crate::models::{BackupId, BackupRecord, NewBackup};

/// Field every time-ordered query sorts on
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Repository for backup records
pub struct BackupStore<'a> {
    collection: &'a dyn DocumentStore,
}

impl<'a> BackupStore<'a> {
    pub fn new(collection: &'a dyn DocumentStore) -> Self {
        Self { collection }
    }

    /// Append a record under a freshly assigned identifier
    pub fn append(&self, backup: &NewBackup) -> UndoResult<BackupId> {
        let mut doc = match serde_json::to_value(backup)? {
            Value::Object(map) => map,
            _ => return Err(UndoError::Json("Backup did not serialize to an object".into())),
        };

        let id = BackupId::new();
        doc.insert(
            ID_FIELD.to_string(),
            Value::String(to_document_id(&id).as_str().to_string()),
        );
        self.collection.insert_one(doc)?;
        Ok(id)
    }

    pub fn count_all(&self) -> UndoResult<usize> {
        self.collection.count(&Document::new())
    }

    /// Up to `limit` records ordered by timestamp
    pub fn list_ordered_by_time(
        &self,
        direction: SortDirection,
        limit: usize,
    ) -> UndoResult<Vec<BackupRecord>> {
        self.collection
            .find_sorted(TIMESTAMP_FIELD, direction, limit)?
            .into_iter()
            .map(to_record)
            .collect()
    }

    /// Delete a batch of records, returning how many existed
    pub fn delete_by_ids(&self, ids: &[BackupId]) -> UndoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let doc_ids: Vec<DocumentId> = ids.iter().map(to_document_id).collect();
        self.collection.delete_by_ids(&doc_ids)
    }

    /// Delete one record; `false` if it was already gone
    pub fn delete_by_id(&self, id: BackupId) -> UndoResult<bool> {
        self.collection.delete_by_id(&to_document_id(&id))
    }

    pub fn delete_all(&self) -> UndoResult<usize> {
        self.collection.delete_all()
    }
}

fn to_document_id(id: &BackupId) -> DocumentId {
    DocumentId::new(id.as_uuid().to_string())
}

fn to_record(doc: Document) -> UndoResult<BackupRecord> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| UndoError::Persistence(format!("Malformed backup record: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MutationAction;
    use crate::storage::MemoryCollection;
    use serde_json::json;

    fn backup(order_id: &str) -> NewBackup {
        NewBackup::new(
            order_id,
            MutationAction::Update,
            Some(json!({"order": order_id})),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_append_assigns_id() {
        let collection = MemoryCollection::new();
        let store = BackupStore::new(&collection);

        let id = store.append(&backup("A1")).unwrap();
        let records = store.list_ordered_by_time(SortDirection::Descending, 1).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].order_id, "A1");
    }

    #[test]
    fn test_list_ordered_by_time() {
        let collection = MemoryCollection::new();
        let store = BackupStore::new(&collection);

        for order in ["A1", "A2", "A3"] {
            store.append(&backup(order)).unwrap();
        }

        let oldest = store.list_ordered_by_time(SortDirection::Ascending, 2).unwrap();
        let orders: Vec<_> = oldest.iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(orders, vec!["A1", "A2"]);

        let newest = store.list_ordered_by_time(SortDirection::Descending, 1).unwrap();
        assert_eq!(newest[0].order_id, "A3");
    }

    #[test]
    fn test_delete_by_id_is_single_use() {
        let collection = MemoryCollection::new();
        let store = BackupStore::new(&collection);

        let id = store.append(&backup("A1")).unwrap();
        assert!(store.delete_by_id(id).unwrap());
        assert!(!store.delete_by_id(id).unwrap());
        assert_eq!(store.count_all().unwrap(), 0);
    }

    #[test]
    fn test_delete_by_ids_empty_batch() {
        let collection = MemoryCollection::new();
        let store = BackupStore::new(&collection);
        store.append(&backup("A1")).unwrap();

        assert_eq!(store.delete_by_ids(&[]).unwrap(), 0);
        assert_eq!(store.count_all().unwrap(), 1);
    }

    #[test]
    fn test_malformed_record_is_persistence_error() {
        let collection = MemoryCollection::new();
        collection
            .insert_one(crate::storage::document::into_document(json!({
                "timestamp": "2025-01-01T00:00:00.000000000Z"
            })).unwrap())
            .unwrap();
        let store = BackupStore::new(&collection);

        let err = store
            .list_ordered_by_time(SortDirection::Descending, 1)
            .unwrap_err();
        assert!(matches!(err, UndoError::Persistence(_)));
    }
}
