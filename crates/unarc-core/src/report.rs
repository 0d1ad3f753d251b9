//! Reporting for unpack and extraction operations.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::extraction::ExtractStep;

/// Report of a single container unpack.
#[derive(Debug, Clone, Default)]
pub struct UnpackReport {
    /// Directory the container was unpacked into.
    pub destination: PathBuf,

    /// Number of directory entries created.
    pub directories_created: usize,

    /// Number of regular files written.
    pub files_written: usize,

    /// Total payload bytes written to disk.
    pub bytes_written: u64,

    /// Number of entries skipped (unsupported types, missing payloads).
    pub entries_skipped: usize,

    /// One message per skipped entry.
    pub warnings: Vec<String>,
}

impl UnpackReport {
    /// Creates an empty report for the given destination.
    #[must_use]
    pub fn new(destination: PathBuf) -> Self {
        Self {
            destination,
            ..Self::default()
        }
    }

    /// Records a skipped entry.
    pub fn add_skipped(&mut self, path: &Path, reason: &str) {
        self.entries_skipped += 1;
        self.warnings
            .push(format!("skipped {}: {reason}", path.display()));
    }

    /// Returns total number of entries materialized.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_written + self.directories_created
    }

    /// Returns whether any entry was skipped.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Report of a full multi-step extraction.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Location after the last completed step.
    pub location: PathBuf,

    /// Completed steps, in order.
    pub steps: Vec<ExtractStep>,

    /// Wall-clock duration of all steps.
    pub duration: Duration,

    /// `true` if the step limit stopped extraction early.
    pub truncated: bool,
}

impl ExtractionReport {
    /// Creates an empty report starting at `location`.
    #[must_use]
    pub fn new(location: PathBuf) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    /// Number of completed steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the unpack report of the container step, if one ran.
    #[must_use]
    pub fn unpacked(&self) -> Option<&UnpackReport> {
        self.steps.iter().find_map(ExtractStep::unpack_report)
    }
}
