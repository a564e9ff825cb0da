//! Retention policy for the undo log
//!
//! Caps the log at a maximum depth by evicting the oldest records.

use crate::config::settings::DEFAULT_MAX_DEPTH;
use crate::error::UndoResult;
use crate::models::BackupId;
use crate::storage::{BackupStore, SortDirection};

/// Oldest-first eviction beyond a fixed depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_depth: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RetentionPolicy {
    /// A depth below 1 is raised to 1 so the newest backup always survives
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Evict the oldest records beyond `max_depth`
    ///
    /// Count, fetch and delete are separate store calls, so concurrent
    /// pushes can leave a few extra records until the next enforcement.
    /// Returns the ids actually selected for eviction.
    pub fn enforce(&self, store: &BackupStore<'_>) -> UndoResult<Vec<BackupId>> {
        let count = store.count_all()?;
        if count <= self.max_depth {
            return Ok(Vec::new());
        }

        let excess = count - self.max_depth;
        let ids: Vec<BackupId> = store
            .list_ordered_by_time(SortDirection::Ascending, excess)?
            .into_iter()
            .map(|record| record.id)
            .collect();

        let deleted = store.delete_by_ids(&ids)?;
        tracing::info!(
            evicted = deleted,
            max_depth = self.max_depth,
            "evicted oldest backups"
        );

        Ok(ids)
    }
}
