//! File-backed document collection
//!
//! Each collection lives in a single JSON file. Nothing is cached: every call
//! reads the file fresh, and every mutation rewrites it atomically before
//! returning. Mutations hold the lock file next to the collection for the
//! whole read-modify-write, so independent instances pointed at the same
//! file, in this process or another, never overwrite each other.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::document::{self, Document, DocumentId, SortDirection};
use super::file_io::{read_json, write_json_atomic};
use super::lock::with_file_lock;
use super::DocumentStore;
use crate::error::UndoResult;

/// On-disk layout of a collection file
#[derive(Debug, Default, Serialize, Deserialize)]
struct CollectionData {
    #[serde(default)]
    documents: Vec<Document>,
}

/// A document collection persisted as one JSON file
pub struct JsonCollection {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonCollection {
    pub fn new(path: PathBuf) -> Self {
        Self {
            lock_path: path.with_extension("lock"),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> UndoResult<Vec<Document>> {
        let data: CollectionData = read_json(&self.path)?;
        Ok(data.documents)
    }

    /// Load, apply `f`, and write back if `f` reports a change
    fn modify<R>(
        &self,
        f: impl FnOnce(&mut Vec<Document>) -> UndoResult<(R, bool)>,
    ) -> UndoResult<R> {
        with_file_lock(&self.lock_path, || {
            let mut documents = self.load()?;
            let (result, changed) = f(&mut documents)?;
            if changed {
                write_json_atomic(&self.path, &CollectionData { documents })?;
            }
            Ok(result)
        })
    }
}

impl DocumentStore for JsonCollection {
    fn insert_one(&self, doc: Document) -> UndoResult<DocumentId> {
        self.modify(|docs| Ok((document::insert(docs, doc)?, true)))
    }

    fn find_by_id(&self, id: &DocumentId) -> UndoResult<Option<Document>> {
        let docs = self.load()?;
        Ok(document::position(&docs, id).map(|i| docs[i].clone()))
    }

    fn find_sorted(
        &self,
        field: &str,
        direction: SortDirection,
        limit: usize,
    ) -> UndoResult<Vec<Document>> {
        let docs = self.load()?;
        Ok(document::sorted(&docs, field, direction, limit))
    }

    fn count(&self, filter: &Document) -> UndoResult<usize> {
        let docs = self.load()?;
        Ok(docs.iter().filter(|d| document::matches(d, filter)).count())
    }

    fn delete_by_ids(&self, ids: &[DocumentId]) -> UndoResult<usize> {
        self.modify(|docs| {
            let before = docs.len();
            docs.retain(|d| DocumentId::of(d).map_or(true, |id| !ids.contains(&id)));
            let deleted = before - docs.len();
            Ok((deleted, deleted > 0))
        })
    }

    fn delete_by_id(&self, id: &DocumentId) -> UndoResult<bool> {
        self.modify(|docs| match document::position(docs, id) {
            Some(i) => {
                docs.remove(i);
                Ok((true, true))
            }
            None => Ok((false, false)),
        })
    }

    fn delete_all(&self) -> UndoResult<usize> {
        self.modify(|docs| {
            let deleted = docs.len();
            docs.clear();
            Ok((deleted, deleted > 0))
        })
    }

    fn replace_by_id(&self, id: &DocumentId, doc: Document) -> UndoResult<bool> {
        self.modify(|docs| match document::position(docs, id) {
            Some(i) => {
                document::replace_fields(&mut docs[i], doc);
                Ok((true, true))
            }
            None => Ok((false, false)),
        })
    }
}
