//! Undo log manager
//!
//! Records pre-mutation snapshots of orders, keeps the log bounded, and
//! restores the most recent snapshot on request.
//!
//! Nothing is cached here: "latest" is always a fresh descending query, so
//! any number of managers sharing one backup collection agree on it.

use std::path::PathBuf;

use serde_json::Value;

use super::restore::{apply_snapshot, RestoreOutcome};
use super::retention::RetentionPolicy;
use crate::config::settings::Settings;
use crate::error::{UndoError, UndoResult};
use crate::models::{BackupId, BackupRecord, MutationAction, NewBackup};
use crate::storage::{with_file_lock, BackupStore, DocumentStore, NamedLocks, SortDirection, Storage};

/// Log name used when none is configured
pub const DEFAULT_LOG_NAME: &str = "orders";

/// Manages the undo log for one protected collection
pub struct UndoLog<'a> {
    backups: BackupStore<'a>,
    target: &'a dyn DocumentStore,
    retention: RetentionPolicy,
    log_name: String,
    restore_lock: Option<PathBuf>,
}

impl<'a> UndoLog<'a> {
    /// Create an undo log over `backups` protecting `target`
    pub fn new(backups: &'a dyn DocumentStore, target: &'a dyn DocumentStore) -> Self {
        Self {
            backups: BackupStore::new(backups),
            target,
            retention: RetentionPolicy::default(),
            log_name: DEFAULT_LOG_NAME.to_string(),
            restore_lock: None,
        }
    }

    /// Create the undo log for the on-disk collections
    ///
    /// Restores take `<data dir>/<log name>.restore.lock`, so restores run by
    /// separate processes are serialized as well.
    pub fn from_settings(storage: &'a Storage, settings: &Settings) -> Self {
        let lock_name = format!("{}.restore.lock", settings.log_name.replace(['/', '\\'], "_"));
        Self::new(&storage.backups, &storage.orders)
            .with_retention(RetentionPolicy::new(settings.retention.max_depth))
            .with_log_name(settings.log_name.clone())
            .with_restore_lock(storage.paths().data_dir().join(lock_name))
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Name of the logical log; restores of the same name are serialized
    pub fn with_log_name(mut self, log_name: impl Into<String>) -> Self {
        self.log_name = log_name.into();
        self
    }

    /// Lock file held for the whole of each restore
    pub fn with_restore_lock(mut self, path: impl Into<PathBuf>) -> Self {
        self.restore_lock = Some(path.into());
        self
    }

    pub fn retention(&self) -> &RetentionPolicy {
        &self.retention
    }

    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    /// Record a snapshot taken just before `action` is applied to an order
    ///
    /// Fails with a validation error when `previous_data` is missing. When
    /// the record was stored but evicting old records failed, the error is
    /// `RetentionFailed` and still names the stored backup. A failure here
    /// is reported to the caller but must not stop it from applying its own
    /// mutation.
    pub fn record_mutation(
        &self,
        order_id: &str,
        action: MutationAction,
        previous_data: Option<Value>,
        new_data: Option<Value>,
        description: Option<String>,
    ) -> UndoResult<BackupId> {
        let backup = NewBackup::new(order_id, action, previous_data, new_data, description)?;
        let id = self.backups.append(&backup)?;
        tracing::debug!(backup_id = %id, order_id, %action, "recorded backup");

        self.retention
            .enforce(&self.backups)
            .map_err(|e| UndoError::RetentionFailed {
                backup_id: id,
                source: Box::new(e),
            })?;
        Ok(id)
    }

    /// The newest record, without consuming it
    pub fn peek_latest(&self) -> UndoResult<BackupRecord> {
        self.backups
            .list_ordered_by_time(SortDirection::Descending, 1)?
            .into_iter()
            .next()
            .ok_or(UndoError::EmptyLog)
    }

    /// Undo the most recent recorded mutation and consume its record
    ///
    /// The record is only deleted after its snapshot was applied; when the
    /// apply step fails the record stays in the log and the restore can be
    /// retried. If the apply step succeeds but the record cannot be
    /// deleted, the outcome carries a `cleanup_warning`.
    pub fn restore_latest(&self) -> UndoResult<RestoreOutcome> {
        let lock = NamedLocks::get(&self.log_name);
        let _guard = NamedLocks::acquire(&lock);

        match &self.restore_lock {
            Some(path) => with_file_lock(path, || self.restore_locked()),
            None => self.restore_locked(),
        }
    }

    fn restore_locked(&self) -> UndoResult<RestoreOutcome> {
        let record = self.peek_latest()?;
        let restored_id = apply_snapshot(self.target, &record)?;
        let mut outcome = RestoreOutcome::new(&record, restored_id);

        match self.backups.delete_by_id(record.id) {
            Ok(true) => {
                tracing::info!(
                    backup_id = %record.id,
                    order_id = %record.order_id,
                    action = %record.action,
                    "restored backup"
                );
            }
            Ok(false) => {
                let warning = format!(
                    "Backup {} was already removed by another restore or eviction",
                    record.id
                );
                tracing::warn!(backup_id = %record.id, "{}", warning);
                outcome.cleanup_warning = Some(warning);
            }
            Err(e) => {
                let warning = format!(
                    "Order {} was restored but backup {} could not be removed ({}); \
                     delete it manually before restoring again",
                    record.order_id, record.id, e
                );
                tracing::warn!(backup_id = %record.id, error = %e, "restored backup left in log");
                outcome.cleanup_warning = Some(warning);
            }
        }

        Ok(outcome)
    }

    pub fn count_backups(&self) -> UndoResult<usize> {
        self.backups.count_all()
    }

    /// Up to `limit` records, newest first
    pub fn list_backups(&self, limit: usize) -> UndoResult<Vec<BackupRecord>> {
        self.backups
            .list_ordered_by_time(SortDirection::Descending, limit)
    }

    /// Delete every record; irreversible
    pub fn clear_all(&self) -> UndoResult<usize> {
        let deleted = self.backups.delete_all()?;
        tracing::info!(deleted, log = %self.log_name, "cleared undo log");
        Ok(deleted)
    }
}
