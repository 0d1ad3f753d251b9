//! Error types for decompression and extraction steps.

use std::io;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Errors raised by a single codec or by codec registration.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The codec rejected the byte stream (corrupt, truncated or wrong format).
    #[error("{codec} stream rejected: {source}")]
    Corrupt {
        /// Human-readable codec name.
        codec: String,
        /// Underlying decoder error.
        #[source]
        source: io::Error,
    },

    /// The extension is reserved for the container step.
    #[error("extension `{0}` is reserved for the container format")]
    ReservedExtension(String),

    /// The extension is empty or is not a single suffix.
    #[error("invalid codec extension `{0}`")]
    InvalidExtension(String),
}

impl CodecError {
    /// Wraps a decoder error for the named codec.
    pub fn corrupt(codec: impl Into<String>, source: io::Error) -> Self {
        Self::Corrupt {
            codec: codec.into(),
            source,
        }
    }
}

/// Errors raised while opening or unpacking a container.
#[derive(Error, Debug)]
pub enum UnpackError {
    /// The buffer cannot be parsed as a tar container. Nothing was written.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// Creating a directory or writing a file failed partway through.
    #[error("filesystem failure at {}: {source}", path.display())]
    FilesystemFailure {
        /// Path that could not be created or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An entry name would resolve outside the destination root.
    #[error("entry path escapes the destination root: {}", path.display())]
    UnsafeEntryPath {
        /// The raw entry name.
        path: PathBuf,
    },

    /// The entry sequence of a container was requested a second time.
    #[error("container entries were already consumed")]
    EntriesConsumed,
}

impl UnpackError {
    pub(crate) fn malformed(err: impl std::fmt::Display) -> Self {
        Self::MalformedContainer(err.to_string())
    }

    pub(crate) fn filesystem(path: &Path, source: io::Error) -> Self {
        Self::FilesystemFailure {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns `true` if the failure may have left partial output on disk.
    ///
    /// Malformed and unsafe containers are rejected before the destination
    /// directory is created.
    ///
    /// # Examples
    ///
    /// ```
    /// use unarc_core::UnpackError;
    ///
    /// let err = UnpackError::MalformedContainer("bad header".into());
    /// assert!(!err.is_partial());
    /// ```
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::FilesystemFailure { .. })
    }
}

/// Errors surfaced by an extraction step.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The trailing extension is neither a registered codec nor the container.
    ///
    /// Callers looping over steps treat this as "nothing more to extract".
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),

    /// The codec registered for the extension rejected the input.
    #[error("decompression failed for .{extension}: {source}")]
    CodecFailed {
        /// Extension token that selected the codec.
        extension: String,
        /// Codec-level failure.
        #[source]
        source: CodecError,
    },

    /// Unpacking the container failed.
    #[error("container extraction failed: {0}")]
    ContainerFailed(#[from] UnpackError),

    /// Reading the source or writing the decompressed output failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ExtractionError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns `true` if this error only signals that no step applies.
    ///
    /// # Examples
    ///
    /// ```
    /// use unarc_core::ExtractionError;
    ///
    /// let err = ExtractionError::UnsupportedExtension("zip".into());
    /// assert!(err.is_unsupported_extension());
    /// ```
    #[must_use]
    pub const fn is_unsupported_extension(&self) -> bool {
        matches!(self, Self::UnsupportedExtension(_))
    }

    /// Returns the rejected extension token, if this is `UnsupportedExtension`.
    #[must_use]
    pub fn unsupported_extension(&self) -> Option<&str> {
        match self {
            Self::UnsupportedExtension(ext) => Some(ext),
            _ => None,
        }
    }
}
