//! Node metadata carried by directory entries.

use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Type of file system node an entry refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Regular file.
    File {
        /// Size in bytes.
        size: u64,
    },
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink {
        /// Link target path.
        target: CompactString,
    },
}

impl NodeKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File { .. })
    }

    /// Check if this is a symlink.
    pub fn is_symlink(&self) -> bool {
        matches!(self, NodeKind::Symlink { .. })
    }
}

/// Creation and modification times for an entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timestamps {
    /// When the entry was created.
    pub created: SystemTime,
    /// Last modification time.
    pub modified: SystemTime,
}

impl Timestamps {
    /// Timestamps for a freshly created entry.
    pub fn now() -> Self {
        let now = SystemTime::now();
        Self {
            created: now,
            modified: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_discrimination() {
        let file = NodeKind::File { size: 42 };
        assert!(file.is_file());
        assert!(!file.is_dir());
        assert!(!file.is_symlink());

        let dir = NodeKind::Directory;
        assert!(dir.is_dir());

        let link = NodeKind::Symlink {
            target: "target/path".into(),
        };
        assert!(link.is_symlink());
        assert!(!link.is_file());
    }

    #[test]
    fn test_timestamps_now() {
        let ts = Timestamps::now();
        assert_eq!(ts.created, ts.modified);
    }
}
