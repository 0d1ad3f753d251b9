//! High-level public API for step-wise extraction.

use std::path::Path;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::Result;
use crate::extraction::ExtractStep;
use crate::extraction::Extractor;

/// Performs one extraction step on `path` with the default codec registry.
///
/// A codec step writes the decompressed bytes next to the input with the
/// trailing extension removed. A `.tar` step unpacks into a new, uniquely
/// named directory beside the input. Compound names such as `photo.tar.gz`
/// take one call per suffix; [`ExtractStep::may_continue`] tells whether
/// another call can make progress.
///
/// # Errors
///
/// Returns an error if:
/// - No codec or container matches the extension (`UnsupportedExtension`)
/// - The input cannot be read or the output cannot be written
/// - The codec rejects the input
/// - The container is malformed or cannot be unpacked
///
/// # Examples
///
/// ```no_run
/// use unarc_core::ExtractConfig;
/// use unarc_core::extract;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let step = extract("photo.tar.gz", &ExtractConfig::default())?;
/// assert!(step.may_continue());
/// let step = extract(step.location(), &ExtractConfig::default())?;
/// println!("unpacked to {}", step.location().display());
/// # Ok(())
/// # }
/// ```
pub fn extract<P: AsRef<Path>>(path: P, config: &ExtractConfig) -> Result<ExtractStep> {
    Extractor::new(*config).extract(path.as_ref())
}

/// Extracts `path` step by step until no further step applies.
///
/// # Errors
///
/// Returns the error of the first failing step, including
/// `UnsupportedExtension` when nothing applies to `path` itself.
///
/// # Examples
///
/// ```no_run
/// use unarc_core::ExtractConfig;
/// use unarc_core::extract_all;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_all("package.tar.xz", &ExtractConfig::default())?;
/// println!("{} steps, final location {}", report.step_count(), report.location.display());
/// # Ok(())
/// # }
/// ```
pub fn extract_all<P: AsRef<Path>>(path: P, config: &ExtractConfig) -> Result<ExtractionReport> {
    Extractor::new(*config).extract_all(path.as_ref())
}
