//! Uniquely named destination directory for container unpacking.

use std::path::Path;
use std::path::PathBuf;

use uuid::Uuid;

/// Destination root for one unpack operation.
///
/// The directory name is a random UUID, so concurrent unpacks placed in the
/// same parent directory never pick the same name. The name carries no
/// extension, so a finished destination never matches another step.
///
/// Constructing a `DestinationRoot` does not touch the filesystem.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use unarc_core::types::DestinationRoot;
///
/// let a = DestinationRoot::unique_in(Path::new("/downloads"));
/// let b = DestinationRoot::unique_in(Path::new("/downloads"));
/// assert_ne!(a, b);
/// assert_eq!(a.parent(), Path::new("/downloads"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRoot {
    parent: PathBuf,
    path: PathBuf,
}

impl DestinationRoot {
    /// Picks a fresh destination name inside `parent`.
    #[must_use]
    pub fn unique_in(parent: &Path) -> Self {
        let name = Uuid::new_v4().hyphenated().to_string();
        Self {
            parent: parent.to_path_buf(),
            path: parent.join(name),
        }
    }

    /// Returns the destination path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Returns the directory the destination is created in.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> &Path {
        &self.parent
    }

    /// Converts into the destination `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for DestinationRoot {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_unique_in_parent() {
        let dest = DestinationRoot::unique_in(Path::new("/tmp/work"));
        assert_eq!(dest.parent(), Path::new("/tmp/work"));
        assert_eq!(dest.as_path().parent(), Some(Path::new("/tmp/work")));
    }

    #[test]
    fn test_name_has_no_extension() {
        let dest = DestinationRoot::unique_in(Path::new("work"));
        assert!(dest.as_path().extension().is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = (0..1000)
            .map(|_| DestinationRoot::unique_in(Path::new("p")).into_path_buf())
            .collect();
        assert_eq!(names.len(), 1000);
    }

    #[test]
    fn test_relative_parent() {
        let dest = DestinationRoot::unique_in(Path::new(""));
        assert_eq!(dest.as_path().components().count(), 1);
    }
}
