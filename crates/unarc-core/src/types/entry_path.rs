//! Normalized relative path of a container entry.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::error::UnpackError;

/// A container entry name reduced to plain relative components.
///
/// `EntryPath` can only be built through [`EntryPath::parse`], which rejects
/// names that would resolve outside the destination root.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use unarc_core::types::EntryPath;
///
/// let path = EntryPath::parse(Path::new("./a/./b.txt"))?;
/// assert_eq!(path.as_path(), Path::new("a/b.txt"));
///
/// assert!(EntryPath::parse(Path::new("../etc/passwd")).is_err());
/// # Ok::<(), unarc_core::UnpackError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryPath(PathBuf);

impl EntryPath {
    /// Normalizes a raw entry name.
    ///
    /// `.` components are dropped. A `..` component, a root, or a Windows
    /// prefix is rejected.
    ///
    /// # Errors
    ///
    /// Returns `UnpackError::UnsafeEntryPath` if the name escapes the root or
    /// contains a null byte.
    pub fn parse(raw: &Path) -> Result<Self, UnpackError> {
        if raw.as_os_str().as_encoded_bytes().contains(&0) {
            return Err(unsafe_path(raw));
        }

        let mut normalized = PathBuf::new();
        for component in raw.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(unsafe_path(raw));
                }
            }
        }
        Ok(Self(normalized))
    }

    /// Returns `true` if the name refers to the destination root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Returns the normalized relative path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Resolves the entry under a destination root.
    #[must_use]
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

fn unsafe_path(raw: &Path) -> UnpackError {
    UnpackError::UnsafeEntryPath {
        path: raw.to_path_buf(),
    }
}
