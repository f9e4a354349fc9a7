//! Entry identifiers.

use serde::{Deserialize, Serialize};

/// Unique identifier for an entry within a volume.
///
/// Ids are allocated monotonically by the owning volume and never reused,
/// so a stale id can never alias a newer entry. Cursors record an
/// `EntryId` rather than a reference: the id is a non-owning handle,
/// resolved through the directory when an entry is actually needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl EntryId {
    /// Create a new EntryId from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id() {
        let id = EntryId::new(7);
        assert_eq!(id.0, 7);
        assert_eq!(id, EntryId::new(7));
        assert_ne!(id, EntryId::new(8));
    }
}
