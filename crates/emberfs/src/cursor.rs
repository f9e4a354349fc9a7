//! Mutation-safe directory cursors.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{trace, warn};

use emberfs_core::{EntryId, FsError};

use crate::directory::Directory;
use crate::entry::Entry;

/// The shared slice of cursor state that a directory's removal path may
/// write through.
///
/// Suspended cursors register their cell on the entry they observe; the
/// removal path pushes a corrected position through
/// [`CursorCell::set_current`]. The registration is an observer handle,
/// not a reference count: the entry list holds `Weak<CursorCell>`, and
/// neither side keeps the other alive.
#[derive(Debug, Default)]
pub(crate) struct CursorCell {
    state: Mutex<CursorState>,
}

#[derive(Debug, Default, Clone, Copy)]
struct CursorState {
    /// Entry last returned, or pending return.
    position: Option<EntryId>,
    /// `position` was pushed externally and must be returned verbatim
    /// by the next `get_next`.
    pending_override: bool,
    /// Enumeration produced not-found; sticky until rewind or rebind.
    exhausted: bool,
}

impl CursorCell {
    /// Push a corrected position. Invoked only by directory removal
    /// logic, with the iterator lock held.
    ///
    /// With `is_next` true, `entry` is handed back verbatim by the next
    /// `get_next`; with `is_next` false, `entry` becomes the anchor the
    /// next forward query resumes from. `entry = None` exhausts the
    /// cursor.
    pub(crate) fn set_current(&self, entry: Option<EntryId>, is_next: bool) {
        let mut state = self.state.lock();
        state.position = entry;
        state.pending_override = is_next;
        state.exhausted = entry.is_none();
    }

    fn snapshot(&self) -> CursorState {
        *self.state.lock()
    }

    fn position(&self) -> Option<EntryId> {
        self.state.lock().position
    }

    fn consume_override(&self) -> Option<EntryId> {
        let mut state = self.state.lock();
        state.pending_override = false;
        state.position
    }

    fn advance_to(&self, id: EntryId) {
        self.state.lock().position = Some(id);
    }

    fn mark_exhausted(&self) {
        self.state.lock().exhausted = true;
    }

    fn reset(&self) {
        *self.state.lock() = CursorState::default();
    }
}

/// A cursor over a directory's entries that survives concurrent
/// mutation.
///
/// Enumeration is lazy: the cursor never buffers past its current
/// position, and the position itself is a non-owning [`EntryId`] — the
/// cursor never keeps the entry it observes alive. Before giving up
/// synchronous access to the directory, the consumer calls
/// [`suspend`](Self::suspend), which registers the cursor on the entry
/// it observes; [`resume`](Self::resume) reverses that. If the observed
/// entry is removed in between, the removal path pushes a corrected
/// position that the first `get_next` after resuming honors — the cursor
/// never sees the freed entry, never repeats a visited one, and never
/// skips a survivor.
#[derive(Debug, Default)]
pub struct EntryIterator {
    directory: Option<Arc<Directory>>,
    cell: Arc<CursorCell>,
    suspended: bool,
}

impl EntryIterator {
    /// An unbound cursor; bind it with [`set_to`](Self::set_to).
    pub fn new() -> Self {
        Self::default()
    }

    /// A cursor bound to `directory`, positioned at the start.
    pub fn for_directory(directory: &Arc<Directory>) -> Self {
        Self {
            directory: Some(Arc::clone(directory)),
            cell: Arc::new(CursorCell::default()),
            suspended: false,
        }
    }

    /// Bind the cursor to `directory`, first fully tearing down any
    /// previous binding (detaching if attached) and resetting all state.
    pub fn set_to(&mut self, directory: &Arc<Directory>) {
        self.unset();
        self.directory = Some(Arc::clone(directory));
    }

    /// Idempotent teardown: detach from the observed entry if attached,
    /// then clear all state. Safe on an unbound cursor, and acquires no
    /// lock unless a detachment is actually needed.
    pub fn unset(&mut self) {
        if self.suspended {
            if let Err(err) = self.detach() {
                // The fresh cell below invalidates the stale weak
                // registration; notification sweeps it later.
                warn!(%err, "cursor teardown could not detach");
            }
        }
        self.directory = None;
        self.cell = Arc::new(CursorCell::default());
        self.suspended = false;
    }

    /// Register the cursor as an observer of the entry it currently
    /// points at, so removals correct it while the consumer is away.
    ///
    /// Succeeds without registering when nothing has been returned yet —
    /// there is nothing to invalidate at the start position.
    pub fn suspend(&mut self) -> Result<(), FsError> {
        let directory = self.directory.as_ref().ok_or(FsError::Unbound)?;
        if self.suspended {
            return Err(FsError::AlreadySuspended);
        }

        if let Some(id) = self.cell.position() {
            let _guard = directory.volume().lock_iterators()?;
            // The position is live: the consumer still holds synchronous
            // access until this call returns.
            if let Some(entry) = directory.entry_by_id(id) {
                entry.attach_observer(&self.cell);
            }
        }

        self.suspended = true;
        trace!("cursor suspended");
        Ok(())
    }

    /// Reverse [`suspend`](Self::suspend): deregister from the observed
    /// entry. Succeeds as a no-op when not suspended.
    pub fn resume(&mut self) -> Result<(), FsError> {
        if self.directory.is_none() {
            return Err(FsError::Unbound);
        }

        if self.suspended {
            self.detach()?;
        }
        self.suspended = false;
        trace!("cursor resumed");
        Ok(())
    }

    /// The next entry in enumeration order.
    ///
    /// A correction pushed while the cursor was suspended is honored
    /// before any directory query. `NotFound` is sticky until
    /// [`rewind`](Self::rewind) or [`set_to`](Self::set_to).
    pub fn get_next(&mut self) -> Result<Arc<Entry>, FsError> {
        let directory = self.directory.as_ref().ok_or(FsError::Unbound)?;

        let state = self.cell.snapshot();
        if state.exhausted {
            return Err(FsError::NotFound);
        }

        if state.pending_override {
            return match self.cell.consume_override() {
                Some(id) => match directory.entry_by_id(id) {
                    Some(entry) => Ok(entry),
                    None => {
                        self.cell.mark_exhausted();
                        Err(FsError::NotFound)
                    }
                },
                None => {
                    self.cell.mark_exhausted();
                    Err(FsError::NotFound)
                }
            };
        }

        match directory.next_entry(state.position) {
            Ok(entry) => {
                self.cell.advance_to(entry.id());
                Ok(entry)
            }
            Err(err) => {
                self.cell.mark_exhausted();
                Err(err)
            }
        }
    }

    /// Reset enumeration to the beginning: detach first if attached,
    /// then clear position, pending correction, and exhaustion.
    pub fn rewind(&mut self) -> Result<(), FsError> {
        if self.directory.is_none() {
            return Err(FsError::Unbound);
        }

        if self.suspended {
            self.detach()?;
        }
        self.cell.reset();
        Ok(())
    }

    /// Whether the cursor is bound to a directory.
    pub fn is_bound(&self) -> bool {
        self.directory.is_some()
    }

    /// Whether the cursor is currently suspended.
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Detach from whatever entry the cell currently names. The position
    /// is re-read under the lock: a removal may have moved the
    /// registration to a successor entry since the caller last looked.
    fn detach(&self) -> Result<(), FsError> {
        let Some(directory) = &self.directory else {
            return Ok(());
        };
        if self.cell.position().is_none() {
            // Never attached: suspension at the start position performs
            // no registration.
            return Ok(());
        }

        let _guard = directory.volume().lock_iterators()?;
        if let Some(id) = self.cell.position() {
            if let Some(entry) = directory.entry_by_id(id) {
                entry.detach_observer(&self.cell);
            }
        }
        Ok(())
    }
}

impl Drop for EntryIterator {
    fn drop(&mut self) {
        self.unset();
    }
}
