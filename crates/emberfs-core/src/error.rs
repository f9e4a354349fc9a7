//! Error types for volume and cursor operations.

use std::time::Duration;

use compact_str::CompactString;
use thiserror::Error;

/// Errors that can occur during directory and cursor operations.
#[derive(Debug, Error)]
pub enum FsError {
    /// Enumeration is exhausted, or a looked-up name is absent.
    ///
    /// This is the one expected terminal condition of iteration, not a
    /// defect in the caller.
    #[error("entry not found")]
    NotFound,

    /// An entry with this name already exists.
    #[error("entry already exists: {name}")]
    Exists { name: CompactString },

    /// The entry name failed validation.
    #[error("invalid entry name {name:?}: {reason}")]
    InvalidName {
        name: CompactString,
        reason: &'static str,
    },

    /// Cursor operation on a cursor with no directory bound.
    #[error("cursor is not bound to a directory")]
    Unbound,

    /// Suspend called on a cursor that is already suspended.
    #[error("cursor is already suspended")]
    AlreadySuspended,

    /// The volume iterator lock could not be acquired in time.
    #[error("iterator lock unavailable after {waited:?}")]
    LockTimeout { waited: Duration },
}

impl FsError {
    /// Create an invalid-name error.
    pub fn invalid_name(name: impl Into<CompactString>, reason: &'static str) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason,
        }
    }

    /// Whether this is the expected end-of-enumeration condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_terminal() {
        assert!(FsError::NotFound.is_not_found());
        assert!(!FsError::Unbound.is_not_found());
    }

    #[test]
    fn test_invalid_name_display() {
        let err = FsError::invalid_name("a/b", "contains '/'");
        assert!(err.to_string().contains("a/b"));
        assert!(err.to_string().contains("contains '/'"));
    }
}
