//! Extraction driver and staged unpacking.

pub mod atomic;
pub mod driver;

pub use driver::ExtractStep;
pub use driver::Extractor;
