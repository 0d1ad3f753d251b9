//! Container entry kind.

/// Type tag of an entry inside a container.
///
/// Only directories and regular files are materialized; everything else
/// (symlinks, hardlinks, devices, FIFOs, extension headers) is `Other` and is
/// skipped during unpacking.
///
/// # Examples
///
/// ```
/// use unarc_core::types::EntryKind;
///
/// assert_eq!(EntryKind::from_tar(tar::EntryType::Directory), EntryKind::Directory);
/// assert_eq!(EntryKind::from_tar(tar::EntryType::Symlink), EntryKind::Other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Directory entry.
    Directory,

    /// Regular file entry carrying a payload.
    RegularFile,

    /// Any other entry type.
    Other,
}

impl EntryKind {
    /// Maps a tar header type flag to an entry kind.
    #[must_use]
    pub fn from_tar(entry_type: tar::EntryType) -> Self {
        match entry_type {
            tar::EntryType::Directory => Self::Directory,
            tar::EntryType::Regular | tar::EntryType::Continuous => Self::RegularFile,
            _ => Self::Other,
        }
    }

    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::RegularFile)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}
