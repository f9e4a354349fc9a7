//! In-memory file system with mutation-safe directory cursors.
//!
//! Directories on a [`Volume`] are mutable while being enumerated: an
//! [`EntryIterator`] held across directory mutation never observes a
//! freed entry, never skips a live entry, and never repeats one. The
//! consumer brackets periods where it gives up synchronous access with
//! [`EntryIterator::suspend`] and [`EntryIterator::resume`]; removals
//! delivered in between push a corrected position that the next
//! [`EntryIterator::get_next`] honors.

mod cursor;
mod directory;
mod entry;
mod volume;

pub use cursor::EntryIterator;
pub use directory::Directory;
pub use entry::Entry;
pub use volume::{IteratorLock, IteratorLockGuard, Volume};

pub use emberfs_core::{
    EntryId, FsError, NodeKind, Timestamps, VolumeOptions, VolumeOptionsBuilder,
};
