//! Exclusive locks
//!
//! `NamedLocks` is a process-wide registry of mutexes. `with_file_lock`
//! combines the registry entry for a lock file with an advisory lock on the
//! file itself, so read-modify-write cycles are serialized both between
//! threads and between processes sharing the same data directory.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use fs2::FileExt;

use crate::error::{UndoError, UndoResult};

static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<Mutex<()>>>>> = OnceLock::new();

/// Process-wide registry of named mutexes
pub struct NamedLocks;

impl NamedLocks {
    /// The mutex registered under `name`, created on first use
    pub fn get(name: &str) -> Arc<Mutex<()>> {
        let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
        // The map only ever grows; a poisoned guard still holds a valid map
        let mut locks = registry.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// Block until the named lock is held
    ///
    /// The guarded data is `()`, so poisoning from a panicked holder is
    /// ignored.
    pub fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
        lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Run `f` while holding the exclusive lock on `lock_path`
///
/// Callers naming the same file through different paths share one lock.
/// The lock file is created if missing and never removed.
pub fn with_file_lock<R>(lock_path: &Path, f: impl FnOnce() -> UndoResult<R>) -> UndoResult<R> {
    let key = canonical_lock_path(lock_path)?;
    let mutex = NamedLocks::get(&key.to_string_lossy());
    let _guard = NamedLocks::acquire(&mutex);

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .open(&key)
        .map_err(|e| lock_error(&key, e))?;
    file.lock_exclusive().map_err(|e| lock_error(&key, e))?;
    let _held = HeldLock(file);

    f()
}

/// Releases the advisory lock on drop
struct HeldLock(File);

impl Drop for HeldLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

fn canonical_lock_path(lock_path: &Path) -> UndoResult<PathBuf> {
    let parent = match lock_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = lock_path.file_name().ok_or_else(|| {
        UndoError::Persistence(format!("Invalid lock path: {}", lock_path.display()))
    })?;

    fs::create_dir_all(parent).map_err(|e| lock_error(lock_path, e))?;
    let parent = fs::canonicalize(parent).map_err(|e| lock_error(lock_path, e))?;
    Ok(parent.join(name))
}

fn lock_error(path: &Path, e: std::io::Error) -> UndoError {
    UndoError::Persistence(format!("Failed to lock {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[test]
    fn test_same_name_same_lock() {
        let a = NamedLocks::get("lock-test-orders");
        let b = NamedLocks::get("lock-test-orders");
        let c = NamedLocks::get("lock-test-other");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_named_lock_is_exclusive() {
        let lock = NamedLocks::get("lock-test-exclusive");
        let _guard = NamedLocks::acquire(&lock);

        let again = NamedLocks::get("lock-test-exclusive");
        assert!(again.try_lock().is_err());
    }

    #[test]
    fn test_file_lock_held_while_running() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("orders.lock");

        with_file_lock(&path, || {
            let other = File::open(&path).unwrap();
            assert!(other.try_lock_exclusive().is_err());
            Ok(())
        })
        .unwrap();

        let other = File::open(&path).unwrap();
        assert!(other.try_lock_exclusive().is_ok());
    }

    #[test]
    fn test_file_lock_serializes_aliased_paths() {
        let temp_dir = TempDir::new().unwrap();
        let direct = temp_dir.path().join("data").join("backups.lock");
        let aliased = temp_dir
            .path()
            .join("data")
            .join("..")
            .join("data")
            .join("backups.lock");

        let inside = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for path in [&direct, &aliased, &direct, &aliased] {
                let inside = &inside;
                s.spawn(move || {
                    for _ in 0..20 {
                        with_file_lock(path, || {
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                            std::thread::yield_now();
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                    }
                });
            }
        });
    }

    #[test]
    fn test_error_from_closure_is_returned() {
        let temp_dir = TempDir::new().unwrap();
        let err = with_file_lock::<()>(&temp_dir.path().join("x.lock"), || {
            Err(UndoError::EmptyLog)
        })
        .unwrap_err();
        assert!(err.is_empty_log());
    }
}
