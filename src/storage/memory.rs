//! In-memory document collection
//!
//! Same semantics as `JsonCollection` without touching the filesystem.
//! Useful for embedding the undo log next to another store and for tests.

use std::sync::RwLock;

use super::document::{self, Document, DocumentId, SortDirection};
use super::DocumentStore;
use crate::error::{UndoError, UndoResult};

/// A document collection held in memory
#[derive(Default)]
pub struct MemoryCollection {
    documents: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> UndoResult<std::sync::RwLockReadGuard<'_, Vec<Document>>> {
        self.documents
            .read()
            .map_err(|e| UndoError::Persistence(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> UndoResult<std::sync::RwLockWriteGuard<'_, Vec<Document>>> {
        self.documents
            .write()
            .map_err(|e| UndoError::Persistence(format!("Failed to acquire write lock: {}", e)))
    }
}

impl DocumentStore for MemoryCollection {
    fn insert_one(&self, doc: Document) -> UndoResult<DocumentId> {
        let mut docs = self.write()?;
        document::insert(&mut docs, doc)
    }

    fn find_by_id(&self, id: &DocumentId) -> UndoResult<Option<Document>> {
        let docs = self.read()?;
        Ok(document::position(&docs, id).map(|i| docs[i].clone()))
    }

    fn find_sorted(
        &self,
        field: &str,
        direction: SortDirection,
        limit: usize,
    ) -> UndoResult<Vec<Document>> {
        let docs = self.read()?;
        Ok(document::sorted(&docs, field, direction, limit))
    }

    fn count(&self, filter: &Document) -> UndoResult<usize> {
        let docs = self.read()?;
        Ok(docs.iter().filter(|d| document::matches(d, filter)).count())
    }

    fn delete_by_ids(&self, ids: &[DocumentId]) -> UndoResult<usize> {
        let mut docs = self.write()?;
        let before = docs.len();
        docs.retain(|d| DocumentId::of(d).map_or(true, |id| !ids.contains(&id)));
        Ok(before - docs.len())
    }

    fn delete_by_id(&self, id: &DocumentId) -> UndoResult<bool> {
        let mut docs = self.write()?;
        match document::position(&docs, id) {
            Some(i) => {
                docs.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_all(&self) -> UndoResult<usize> {
        let mut docs = self.write()?;
        let deleted = docs.len();
        docs.clear();
        Ok(deleted)
    }

    fn replace_by_id(&self, id: &DocumentId, doc: Document) -> UndoResult<bool> {
        let mut docs = self.write()?;
        match document::position(&docs, id) {
            Some(i) => {
                document::replace_fields(&mut docs[i], doc);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
