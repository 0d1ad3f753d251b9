//! Value types shared by the unpacker and the extraction driver.
//!
//! Paths that end up on disk go through a newtype: entry names through
//! [`EntryPath`], unpack destinations through [`DestinationRoot`].

pub mod dest_root;
pub mod entry_kind;
pub mod entry_path;

pub use dest_root::DestinationRoot;
pub use entry_kind::EntryKind;
pub use entry_path::EntryPath;
