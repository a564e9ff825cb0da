//! Storage layer for order-undo
//!
//! Defines the generic document-store contract the undo log consumes, a
//! JSON-file implementation with atomic, file-locked writes, an in-memory
//! implementation, and the typed backup repository built on top of them.

pub mod backups;
pub mod collection;
pub mod document;
pub mod file_io;
pub mod lock;
pub mod memory;

pub use backups::BackupStore;
pub use collection::JsonCollection;
pub use document::{Document, DocumentId, SortDirection, ID_FIELD};
pub use file_io::{read_json, write_json_atomic};
pub use lock::{with_file_lock, NamedLocks};
pub use memory::MemoryCollection;

use crate::config::paths::UndoPaths;
use crate::error::{UndoError, UndoResult};

/// A collection of schema-less documents keyed by `_id`
///
/// Every call is a single-shot operation against the backing store; callers
/// must not assume atomicity across calls.
pub trait DocumentStore: Send + Sync {
    /// Insert a document, assigning an `_id` when it has none
    ///
    /// Fails with a conflict when the document's `_id` is already taken.
    fn insert_one(&self, doc: Document) -> UndoResult<DocumentId>;

    fn find_by_id(&self, id: &DocumentId) -> UndoResult<Option<Document>>;

    /// Up to `limit` documents ordered by `field`
    fn find_sorted(
        &self,
        field: &str,
        direction: SortDirection,
        limit: usize,
    ) -> UndoResult<Vec<Document>>;

    /// Count documents whose fields equal every field of `filter`
    fn count(&self, filter: &Document) -> UndoResult<usize>;

    fn delete_by_ids(&self, ids: &[DocumentId]) -> UndoResult<usize>;

    /// Delete one document; `false` if no document had that id
    fn delete_by_id(&self, id: &DocumentId) -> UndoResult<bool>;

    fn delete_all(&self) -> UndoResult<usize>;

    /// Replace every field except `_id`; `false` if no document had that id
    fn replace_by_id(&self, id: &DocumentId, doc: Document) -> UndoResult<bool>;
}

/// Main storage coordinator that owns the on-disk collections
pub struct Storage {
    paths: UndoPaths,
    pub orders: JsonCollection,
    pub backups: JsonCollection,
}

impl Storage {
    pub fn new(paths: UndoPaths) -> Result<Self, UndoError> {
        paths.ensure_directories()?;

        Ok(Self {
            orders: JsonCollection::new(paths.orders_file()),
            backups: JsonCollection::new(paths.backups_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &UndoPaths {
        &self.paths
    }

    /// Typed view over the backup collection
    pub fn backup_store(&self) -> BackupStore<'_> {
        BackupStore::new(&self.backups)
    }
}
