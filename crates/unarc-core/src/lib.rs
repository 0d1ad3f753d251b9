//! Step-wise archive decompression and tar unpacking.
//!
//! `unarc-core` takes a file, picks a step from its trailing extension and
//! performs it: a compression codec (`xz`, `lzma`, `bz2`, `gz`) writes the
//! decompressed bytes next to the input, and a `tar` container is unpacked
//! into a fresh, uniquely named directory. Each call performs exactly one
//! step and returns the new location; the input file is never modified.
//!
//! # Examples
//!
//! ```no_run
//! use unarc_core::ExtractConfig;
//! use unarc_core::extract_all;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = extract_all("photo.tar.gz", &ExtractConfig::default())?;
//! println!("Extracted to {}", report.location.display());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod report;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

// Re-export main API types
pub use api::extract;
pub use api::extract_all;
pub use config::ExtractConfig;
pub use error::CodecError;
pub use error::ExtractionError;
pub use error::Result;
pub use error::UnpackError;
pub use extraction::ExtractStep;
pub use extraction::Extractor;
pub use report::ExtractionReport;
pub use report::UnpackReport;
