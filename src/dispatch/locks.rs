//! Per-file lock registry
//!
//! Serializes load → save cycles on the same file within one process.
//! Entries hold `Weak` handles and are pruned once no caller holds them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct FileLocks {
    locks: Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>,
}

impl FileLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        if let Some(live) = locks.get(path).and_then(Weak::upgrade) {
            return live;
        }
        let fresh = Arc::new(Mutex::new(()));
        locks.insert(path.to_path_buf(), Arc::downgrade(&fresh));
        fresh
    }

    fn prune(&self) {
        self.locks.lock().retain(|_, weak| weak.strong_count() > 0);
    }

    /// Run `f` while holding the locks of every path.
    ///
    /// Paths are deduplicated and locked in sorted order, so two callers
    /// touching the same pair of files cannot deadlock.
    pub fn with_locked<T>(&self, paths: &[PathBuf], f: impl FnOnce() -> T) -> T {
        let mut ordered: Vec<&PathBuf> = paths.iter().collect();
        ordered.sort();
        ordered.dedup();

        let handles: Vec<Arc<Mutex<()>>> = ordered.iter().map(|p| self.handle(p)).collect();
        let out = {
            let _guards: Vec<MutexGuard<'_, ()>> = handles.iter().map(|h| h.lock()).collect();
            f()
        };

        drop(handles);
        self.prune();
        out
    }

    /// Number of files currently locked or waited on.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_same_path_twice_does_not_deadlock() {
        let locks = FileLocks::new();
        let path = PathBuf::from("/tmp/a.xlsx");
        let out = locks.with_locked(&[path.clone(), path], || 42);
        assert_eq!(out, 42);
        assert!(locks.is_empty());
    }

    #[test]
    fn test_serializes_same_file() {
        let locks = Arc::new(FileLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let path = PathBuf::from("/tmp/shared.xlsx");

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let path = path.clone();
                thread::spawn(move || {
                    locks.with_locked(&[path], || {
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        thread::sleep(std::time::Duration::from_millis(2));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn test_opposite_order_pairs_complete() {
        let locks = Arc::new(FileLocks::new());
        let a = PathBuf::from("/tmp/a.xlsx");
        let b = PathBuf::from("/tmp/b.xlsx");

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let locks = Arc::clone(&locks);
                let pair = if i % 2 == 0 {
                    vec![a.clone(), b.clone()]
                } else {
                    vec![b.clone(), a.clone()]
                };
                thread::spawn(move || locks.with_locked(&pair, || ()))
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
        assert!(locks.is_empty());
    }

    #[test]
    fn test_registry_shrinks_after_calls() {
        let locks = FileLocks::new();
        for i in 0..1000 {
            let path = PathBuf::from(format!("/tmp/file-{}.xlsx", i));
            locks.with_locked(&[path], || ());
        }
        assert!(locks.is_empty());
        assert!(locks.locks.lock().is_empty());
    }

    #[test]
    fn test_entry_is_live_while_held() {
        let locks = FileLocks::new();
        let path = PathBuf::from("/tmp/held.xlsx");
        locks.with_locked(std::slice::from_ref(&path), || {
            assert_eq!(locks.len(), 1);
        });
        assert!(locks.is_empty());
    }
}
