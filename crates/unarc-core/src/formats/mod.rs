//! Codec and container format implementations.

pub mod codec;
pub mod tar;

// Re-export main types for convenience
pub use codec::Codec;
pub use codec::CodecEntry;
pub use codec::CodecRegistry;
pub use codec::DecompressFn;
pub use tar::ContainerEntry;
pub use tar::TarContainer;
