//! Volume state and the iterator lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use emberfs_core::{EntryId, FsError, VolumeOptions};

/// Guard for the volume iterator lock.
pub type IteratorLockGuard<'a> = ReentrantMutexGuard<'a, ()>;

/// Re-entrant lock serializing cursor attach, detach, and correction
/// delivery volume-wide.
///
/// Re-entrancy is required: a cursor operation may run nested inside a
/// removal-notification path that already holds the lock, and must be
/// able to acquire it again without deadlocking its own thread.
#[derive(Debug, Default)]
pub struct IteratorLock {
    inner: ReentrantMutex<()>,
}

impl IteratorLock {
    /// Acquire the lock, waiting at most `timeout`.
    pub fn acquire(&self, timeout: Duration) -> Result<IteratorLockGuard<'_>, FsError> {
        self.inner
            .try_lock_for(timeout)
            .ok_or(FsError::LockTimeout { waited: timeout })
    }
}

/// An in-memory volume: entry id allocation plus the per-volume
/// iterator lock shared by all of its directories.
#[derive(Debug)]
pub struct Volume {
    options: VolumeOptions,
    iterator_lock: IteratorLock,
    next_entry_id: AtomicU64,
}

impl Volume {
    /// Create a new volume.
    pub fn new(options: VolumeOptions) -> Arc<Self> {
        Arc::new(Self {
            options,
            iterator_lock: IteratorLock::default(),
            next_entry_id: AtomicU64::new(1),
        })
    }

    /// The volume name.
    pub fn name(&self) -> &str {
        &self.options.name
    }

    /// The volume configuration.
    pub fn options(&self) -> &VolumeOptions {
        &self.options
    }

    /// The volume-wide iterator lock.
    pub fn iterator_lock(&self) -> &IteratorLock {
        &self.iterator_lock
    }

    /// Acquire the iterator lock within the configured timeout.
    pub(crate) fn lock_iterators(&self) -> Result<IteratorLockGuard<'_>, FsError> {
        self.iterator_lock.acquire(self.options.lock_timeout)
    }

    /// Hand out the next entry id. Ids are never reused.
    pub(crate) fn allocate_entry_id(&self) -> EntryId {
        EntryId::new(self.next_entry_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use emberfs_core::VolumeOptionsBuilder;

    use super::*;

    #[test]
    fn test_entry_ids_are_monotonic() {
        let volume = Volume::new(VolumeOptions::named("test"));
        let a = volume.allocate_entry_id();
        let b = volume.allocate_entry_id();
        assert!(b.0 > a.0);
    }

    #[test]
    fn test_iterator_lock_is_reentrant() {
        let volume = Volume::new(VolumeOptions::named("test"));
        let _outer = volume.lock_iterators().unwrap();
        // Same thread can nest the acquisition.
        let _inner = volume.lock_iterators().unwrap();
    }

    #[test]
    fn test_iterator_lock_times_out_under_contention() {
        let volume = Volume::new(
            VolumeOptionsBuilder::default()
                .name("test")
                .lock_timeout(Duration::from_millis(10))
                .build()
                .unwrap(),
        );

        let held = Arc::clone(&volume);
        let (tx, rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let holder = std::thread::spawn(move || {
            let _guard = held.lock_iterators().unwrap();
            tx.send(()).unwrap();
            release_rx.recv().unwrap();
        });

        rx.recv().unwrap();
        let result = volume.lock_iterators();
        assert!(matches!(result, Err(FsError::LockTimeout { .. })));

        release_tx.send(()).unwrap();
        holder.join().unwrap();
    }
}
