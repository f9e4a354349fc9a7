//! Directory entry nodes and their observer lists.

use std::sync::{Arc, Weak};

use compact_str::CompactString;
use parking_lot::Mutex;

use emberfs_core::{EntryId, NodeKind, Timestamps};

use crate::cursor::CursorCell;

/// A named entry in a directory.
///
/// Besides its node metadata, every entry carries an observer list: the
/// suspended cursors currently depending on this entry for correct
/// repositioning. The list holds weak handles only — an observer
/// registration is not a reference count, and a dropped cursor's handle
/// simply fails to upgrade. The list is touched only while the volume
/// iterator lock is held.
#[derive(Debug)]
pub struct Entry {
    id: EntryId,
    name: Mutex<CompactString>,
    kind: NodeKind,
    timestamps: Timestamps,
    observers: Mutex<Vec<Weak<CursorCell>>>,
}

impl Entry {
    pub(crate) fn new(id: EntryId, name: CompactString, kind: NodeKind) -> Self {
        Self {
            id,
            name: Mutex::new(name),
            kind,
            timestamps: Timestamps::now(),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// The entry's id, stable across renames.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Snapshot of the entry's current name.
    pub fn name(&self) -> CompactString {
        self.name.lock().clone()
    }

    /// The node this entry refers to.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Creation and modification times.
    pub fn timestamps(&self) -> Timestamps {
        self.timestamps
    }

    pub(crate) fn set_name(&self, name: CompactString) {
        *self.name.lock() = name;
    }

    /// Register a suspended cursor's cell. Caller holds the iterator lock.
    pub(crate) fn attach_observer(&self, cell: &Arc<CursorCell>) {
        self.observers.lock().push(Arc::downgrade(cell));
    }

    /// Deregister a cursor's cell. Caller holds the iterator lock.
    pub(crate) fn detach_observer(&self, cell: &Arc<CursorCell>) {
        self.observers
            .lock()
            .retain(|observer| observer.as_ptr() != Arc::as_ptr(cell));
    }

    /// Drain the observer list, keeping only still-live cells. Caller
    /// holds the iterator lock.
    pub(crate) fn take_observers(&self) -> Vec<Arc<CursorCell>> {
        self.observers
            .lock()
            .drain(..)
            .filter_map(|observer| observer.upgrade())
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .iter()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }
}
