//! Ordered directory storage and the cursor-correction removal path.

use std::collections::HashMap;
use std::sync::Arc;

use compact_str::CompactString;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use emberfs_core::{EntryId, FsError, NodeKind};

use crate::entry::Entry;
use crate::volume::Volume;

/// A directory on an in-memory volume.
///
/// Entries enumerate in insertion order; removal preserves the relative
/// order of the survivors, and rename keeps the entry's position and
/// identity. Removal is the notify path of the cursor protocol: every
/// cursor suspended on the removed entry is handed a corrected position
/// and re-registered on the successor before the entry is freed.
#[derive(Debug)]
pub struct Directory {
    volume: Arc<Volume>,
    inner: RwLock<DirInner>,
}

#[derive(Debug, Default)]
struct DirInner {
    /// Entries in enumeration (insertion) order.
    entries: IndexMap<EntryId, Arc<Entry>>,
    /// Name lookup; kept consistent with `entries`.
    by_name: HashMap<CompactString, EntryId>,
}

impl Directory {
    /// Create an empty directory on `volume`.
    pub fn new(volume: &Arc<Volume>) -> Arc<Self> {
        Arc::new(Self {
            volume: Arc::clone(volume),
            inner: RwLock::new(DirInner::default()),
        })
    }

    /// The owning volume.
    pub fn volume(&self) -> &Arc<Volume> {
        &self.volume
    }

    /// Create a new entry at the end of the enumeration order.
    pub fn create(&self, name: &str, kind: NodeKind) -> Result<Arc<Entry>, FsError> {
        self.validate_name(name)?;

        let mut inner = self.inner.write();
        if inner.by_name.contains_key(name) {
            return Err(FsError::Exists { name: name.into() });
        }

        let id = self.volume.allocate_entry_id();
        let entry = Arc::new(Entry::new(id, name.into(), kind));
        inner.by_name.insert(name.into(), id);
        inner.entries.insert(id, Arc::clone(&entry));

        debug!(name, id = id.0, "created entry");
        Ok(entry)
    }

    /// Look up an entry by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<Entry>, FsError> {
        let inner = self.inner.read();
        let id = inner.by_name.get(name).ok_or(FsError::NotFound)?;
        inner.entries.get(id).cloned().ok_or(FsError::NotFound)
    }

    /// Resolve an entry id to the live entry, if it still exists here.
    pub fn entry_by_id(&self, id: EntryId) -> Option<Arc<Entry>> {
        self.inner.read().entries.get(&id).cloned()
    }

    /// Rename `from` to `to`, preserving the entry's enumeration
    /// position and identity. Cursors observing the entry are
    /// unaffected.
    pub fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        self.validate_name(to)?;

        let mut inner = self.inner.write();
        if from == to {
            return if inner.by_name.contains_key(from) {
                Ok(())
            } else {
                Err(FsError::NotFound)
            };
        }
        if inner.by_name.contains_key(to) {
            return Err(FsError::Exists { name: to.into() });
        }

        let id = inner.by_name.remove(from).ok_or(FsError::NotFound)?;
        inner.by_name.insert(to.into(), id);
        if let Some(entry) = inner.entries.get(&id) {
            entry.set_name(to.into());
        }

        debug!(from, to, "renamed entry");
        Ok(())
    }

    /// Remove `name`, correcting every cursor suspended on the removed
    /// entry so it neither repeats a visited entry nor skips a survivor.
    ///
    /// Runs entirely under the iterator lock: the correction delivery
    /// and the re-registration on the successor are atomic with respect
    /// to every other cursor operation on the volume.
    pub fn remove(&self, name: &str) -> Result<(), FsError> {
        let _guard = self.volume.lock_iterators()?;
        let mut inner = self.inner.write();

        let id = inner.by_name.remove(name).ok_or(FsError::NotFound)?;
        let index = match inner.entries.get_index_of(&id) {
            Some(index) => index,
            None => return Err(FsError::NotFound),
        };
        let successor = inner
            .entries
            .get_index(index + 1)
            .map(|(_, entry)| Arc::clone(entry));
        let removed = match inner.entries.shift_remove(&id) {
            Some(entry) => entry,
            None => return Err(FsError::NotFound),
        };

        let observers = removed.take_observers();
        let next_id = successor.as_ref().map(|entry| entry.id());
        for cell in observers {
            // The cursor stays suspended: hand it the successor verbatim
            // and keep it registered so further removals still reach it.
            cell.set_current(next_id, true);
            if let Some(next) = &successor {
                next.attach_observer(&cell);
            }
        }

        debug!(name, id = id.0, "removed entry");
        Ok(())
    }

    /// The entry following `after` in enumeration order; `None` starts
    /// from the beginning.
    ///
    /// Fails with `NotFound` past the end, or if `after` no longer
    /// exists here. A suspended cursor's anchor is corrected before a
    /// removal completes, so a well-behaved consumer never presents a
    /// dead anchor.
    pub fn next_entry(&self, after: Option<EntryId>) -> Result<Arc<Entry>, FsError> {
        let inner = self.inner.read();
        let index = match after {
            None => 0,
            Some(id) => inner.entries.get_index_of(&id).ok_or(FsError::NotFound)? + 1,
        };
        inner
            .entries
            .get_index(index)
            .map(|(_, entry)| Arc::clone(entry))
            .ok_or(FsError::NotFound)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the directory has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry names in enumeration order.
    pub fn names(&self) -> Vec<CompactString> {
        self.inner
            .read()
            .entries
            .values()
            .map(|entry| entry.name())
            .collect()
    }

    fn validate_name(&self, name: &str) -> Result<(), FsError> {
        if name.is_empty() {
            return Err(FsError::invalid_name(name, "empty"));
        }
        if name.len() > self.volume.options().max_name_length {
            return Err(FsError::invalid_name(name, "too long"));
        }
        if name.contains('/') || name.contains('\0') {
            return Err(FsError::invalid_name(name, "contains '/' or NUL"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use emberfs_core::VolumeOptions;

    use super::*;

    fn test_dir() -> Arc<Directory> {
        let volume = Volume::new(VolumeOptions::named("test"));
        Directory::new(&volume)
    }

    #[test]
    fn test_create_and_lookup() {
        let dir = test_dir();
        let entry = dir.create("a", NodeKind::File { size: 10 }).unwrap();
        let found = dir.lookup("a").unwrap();
        assert_eq!(entry.id(), found.id());
        assert!(dir.lookup("b").is_err());
    }

    #[test]
    fn test_create_duplicate_rejected() {
        let dir = test_dir();
        dir.create("a", NodeKind::Directory).unwrap();
        let err = dir.create("a", NodeKind::Directory).unwrap_err();
        assert!(matches!(err, FsError::Exists { .. }));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let dir = test_dir();
        assert!(matches!(
            dir.create("", NodeKind::Directory),
            Err(FsError::InvalidName { .. })
        ));
        assert!(matches!(
            dir.create("a/b", NodeKind::Directory),
            Err(FsError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_enumeration_is_insertion_order() {
        let dir = test_dir();
        for name in ["c", "a", "b"] {
            dir.create(name, NodeKind::File { size: 0 }).unwrap();
        }
        assert_eq!(dir.names(), vec!["c", "a", "b"]);

        let first = dir.next_entry(None).unwrap();
        assert_eq!(first.name(), "c");
        let second = dir.next_entry(Some(first.id())).unwrap();
        assert_eq!(second.name(), "a");
    }

    #[test]
    fn test_removal_preserves_order_of_survivors() {
        let dir = test_dir();
        for name in ["a", "b", "c"] {
            dir.create(name, NodeKind::File { size: 0 }).unwrap();
        }
        dir.remove("b").unwrap();
        assert_eq!(dir.names(), vec!["a", "c"]);
        assert!(dir.remove("b").is_err());
    }

    #[test]
    fn test_rename_keeps_position_and_identity() {
        let dir = test_dir();
        for name in ["a", "b", "c"] {
            dir.create(name, NodeKind::File { size: 0 }).unwrap();
        }
        let before = dir.lookup("b").unwrap();
        dir.rename("b", "z").unwrap();
        let after = dir.lookup("z").unwrap();

        assert_eq!(before.id(), after.id());
        assert_eq!(dir.names(), vec!["a", "z", "c"]);
        assert!(dir.lookup("b").is_err());
    }

    #[test]
    fn test_rename_to_existing_rejected() {
        let dir = test_dir();
        dir.create("a", NodeKind::Directory).unwrap();
        dir.create("b", NodeKind::Directory).unwrap();
        assert!(matches!(
            dir.rename("a", "b"),
            Err(FsError::Exists { .. })
        ));
        // Renaming to the same name is a no-op.
        dir.rename("a", "a").unwrap();
    }

    #[test]
    fn test_next_entry_dead_anchor_reports_not_found() {
        let dir = test_dir();
        let a = dir.create("a", NodeKind::Directory).unwrap();
        dir.create("b", NodeKind::Directory).unwrap();
        let anchor = a.id();
        dir.remove("a").unwrap();
        assert!(dir.next_entry(Some(anchor)).is_err());
    }
}
