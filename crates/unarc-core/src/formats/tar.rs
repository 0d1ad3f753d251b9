//! Tar container parsing and unpacking.
//!
//! A container is opened in two phases. [`TarContainer::open`] walks the
//! whole header chain and rejects anything that is not a well-formed tar
//! stream before the filesystem is touched. [`TarContainer::entries`] then
//! yields the entries one at a time, exactly once.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::error::UnpackError;
use crate::report::UnpackReport;
use crate::types::EntryKind;
use crate::types::EntryPath;

/// Extension token identifying the container format.
pub const CONTAINER_EXTENSION: &str = "tar";

const BLOCK_SIZE: usize = 512;

/// One entry of a container.
///
/// The payload is only present for regular files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    path: PathBuf,
    kind: EntryKind,
    data: Option<Vec<u8>>,
}

impl ContainerEntry {
    /// Creates an entry from its parts.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind, data: Option<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            kind,
            data,
        }
    }

    /// Raw entry name as stored in the container.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry type tag.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Payload bytes, if any.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

/// An opened, structurally validated tar container.
///
/// # Examples
///
/// ```
/// use unarc_core::formats::TarContainer;
///
/// let result = TarContainer::open(b"not a tar");
/// assert!(matches!(result, Err(unarc_core::UnpackError::MalformedContainer(_))));
/// ```
pub struct TarContainer<'a> {
    archive: tar::Archive<&'a [u8]>,
    consumed: bool,
}

impl<'a> TarContainer<'a> {
    /// Parses and validates the container structure.
    ///
    /// Checks every header checksum, that every payload lies inside the
    /// buffer, and that every directory or file name stays inside the
    /// destination root.
    ///
    /// # Errors
    ///
    /// - `UnpackError::MalformedContainer` if the buffer is not a tar stream
    /// - `UnpackError::UnsafeEntryPath` if an entry name escapes the root
    pub fn open(bytes: &'a [u8]) -> Result<Self, UnpackError> {
        if bytes.len() < BLOCK_SIZE {
            return Err(UnpackError::MalformedContainer(format!(
                "{} bytes is shorter than one tar block",
                bytes.len()
            )));
        }

        let len = bytes.len() as u64;
        let mut probe = tar::Archive::new(bytes);
        for entry in probe.entries().map_err(UnpackError::malformed)? {
            let entry = entry.map_err(UnpackError::malformed)?;
            let end = entry.raw_file_position().saturating_add(entry.size());
            if end > len {
                return Err(UnpackError::MalformedContainer(format!(
                    "entry payload ends at byte {end}, past the end of a {len}-byte container"
                )));
            }
            if EntryKind::from_tar(entry.header().entry_type()) != EntryKind::Other {
                let path = entry.path().map_err(UnpackError::malformed)?;
                EntryPath::parse(&path)?;
            }
        }

        Ok(Self {
            archive: tar::Archive::new(bytes),
            consumed: false,
        })
    }

    /// Returns the lazy entry sequence.
    ///
    /// # Errors
    ///
    /// Returns `UnpackError::EntriesConsumed` on the second call.
    pub fn entries(&mut self) -> Result<ContainerEntries<'_, 'a>, UnpackError> {
        if self.consumed {
            return Err(UnpackError::EntriesConsumed);
        }
        self.consumed = true;
        let inner = self.archive.entries().map_err(UnpackError::malformed)?;
        Ok(ContainerEntries { inner })
    }

    /// Materializes every entry under an existing root directory.
    ///
    /// # Errors
    ///
    /// Returns `UnpackError::FilesystemFailure` if a directory or file cannot
    /// be created. Entries written before the failure stay on disk.
    pub fn unpack_into(&mut self, root: &Path) -> Result<UnpackReport, UnpackError> {
        let mut report = UnpackReport::new(root.to_path_buf());
        for entry in self.entries()? {
            materialize(&entry?, root, &mut report)?;
        }
        debug!(
            root = %root.display(),
            files = report.files_written,
            directories = report.directories_created,
            skipped = report.entries_skipped,
            "container unpacked"
        );
        Ok(report)
    }
}

/// Lazy, single-pass sequence of container entries.
pub struct ContainerEntries<'c, 'a> {
    inner: tar::Entries<'c, &'a [u8]>,
}

impl Iterator for ContainerEntries<'_, '_> {
    type Item = Result<ContainerEntry, UnpackError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(UnpackError::malformed(e))),
        };
        Some(read_entry(entry))
    }
}

fn read_entry(mut entry: tar::Entry<'_, &[u8]>) -> Result<ContainerEntry, UnpackError> {
    let path = entry.path().map_err(UnpackError::malformed)?.into_owned();
    let mut kind = EntryKind::from_tar(entry.header().entry_type());

    // Old-style archives mark directories as regular entries with a trailing slash.
    if kind == EntryKind::RegularFile && entry.path_bytes().ends_with(b"/") {
        kind = EntryKind::Directory;
    }

    let data = if kind == EntryKind::RegularFile {
        let mut buf = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry
            .read_to_end(&mut buf)
            .map_err(UnpackError::malformed)?;
        Some(buf)
    } else {
        None
    };

    Ok(ContainerEntry { path, kind, data })
}

fn materialize(
    entry: &ContainerEntry,
    root: &Path,
    report: &mut UnpackReport,
) -> Result<(), UnpackError> {
    match entry.kind() {
        EntryKind::Directory => {
            let relative = EntryPath::parse(entry.path())?;
            if relative.is_root() {
                return Ok(());
            }
            let target = relative.resolve(root);
            fs::create_dir_all(&target).map_err(|e| UnpackError::filesystem(&target, e))?;
            report.directories_created += 1;
            debug!(path = %target.display(), "created directory");
        }
        EntryKind::RegularFile => {
            let Some(data) = entry.data() else {
                debug!(path = %entry.path().display(), "skipping file entry without payload");
                report.add_skipped(entry.path(), "regular file without payload");
                return Ok(());
            };
            let relative = EntryPath::parse(entry.path())?;
            if relative.is_root() {
                debug!(path = %entry.path().display(), "skipping file entry naming the root");
                report.add_skipped(entry.path(), "file entry names the extraction root");
                return Ok(());
            }
            let target = relative.resolve(root);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| UnpackError::filesystem(parent, e))?;
            }
            fs::write(&target, data).map_err(|e| UnpackError::filesystem(&target, e))?;
            report.files_written += 1;
            report.bytes_written += data.len() as u64;
            debug!(path = %target.display(), bytes = data.len(), "wrote file");
        }
        EntryKind::Other => {
            debug!(path = %entry.path().display(), "skipping unsupported entry type");
            report.add_skipped(entry.path(), "unsupported entry type");
        }
    }
    Ok(())
}

/// Unpacks a tar buffer into a new directory at `destination_root`.
///
/// The container is validated before the directory is created, so a
/// malformed buffer leaves the filesystem untouched. The root is created
/// with `create_dir`, which fails if the path already exists.
///
/// # Errors
///
/// - `UnpackError::MalformedContainer` / `UnsafeEntryPath` before any mutation
/// - `UnpackError::FilesystemFailure` if creation or a write fails; partial
///   output is left in place
///
/// # Examples
///
/// ```
/// use unarc_core::formats::tar::unpack;
///
/// let temp = tempfile::tempdir()?;
/// let mut builder = tar::Builder::new(Vec::new());
/// let mut header = tar::Header::new_gnu();
/// header.set_size(5);
/// header.set_mode(0o644);
/// header.set_cksum();
/// builder.append_data(&mut header, "a/b.txt", &b"hello"[..])?;
/// let tar = builder.into_inner()?;
///
/// let report = unpack(&tar, &temp.path().join("out"))?;
/// assert_eq!(std::fs::read(report.destination.join("a/b.txt"))?, b"hello");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn unpack(container_bytes: &[u8], destination_root: &Path) -> Result<UnpackReport, UnpackError> {
    let mut container = TarContainer::open(container_bytes)?;
    fs::create_dir(destination_root)
        .map_err(|e| UnpackError::filesystem(destination_root, e))?;
    container.unpack_into(destination_root)
}
