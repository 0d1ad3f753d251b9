//! Test utilities for building in-memory fixtures.
//!
//! Provides a tar builder covering every entry kind the unpacker
//! distinguishes, and a compressor for each built-in codec.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Write;

use crate::formats::Codec;

/// Compresses `data` in the reference format of `codec`.
#[must_use]
pub fn compress(codec: Codec, data: &[u8]) -> Vec<u8> {
    match codec {
        Codec::Gz => {
            let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        Codec::Bz2 => {
            let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        Codec::Xz => {
            let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        Codec::Lzma => {
            let options = xz2::stream::LzmaOptions::new_preset(6).unwrap();
            let stream = xz2::stream::Stream::new_lzma_encoder(&options).unwrap();
            let mut encoder = xz2::write::XzEncoder::new_stream(Vec::new(), stream);
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
    }
}

/// In-memory tar fixture builder.
///
/// Every entry goes through [`add_entry`](Self::add_entry); the other
/// `add_*` methods only pick the header type and mode.
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Longest name an old-style header can hold.
    pub const RAW_NAME_LIMIT: usize = 100;

    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Appends an entry of any type.
    ///
    /// `link` is the target of symlink and hardlink entries.
    #[must_use]
    pub fn add_entry(
        mut self,
        entry_type: tar::EntryType,
        path: &str,
        data: &[u8],
        link: Option<&str>,
    ) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_size(data.len() as u64);
        header.set_mode(match entry_type {
            tar::EntryType::Directory => 0o755,
            tar::EntryType::Symlink => 0o777,
            _ => 0o644,
        });
        if let Some(target) = link {
            header.set_link_name(target).unwrap();
        }
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Appends a regular file.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_entry(tar::EntryType::Regular, path, data, None)
    }

    /// Appends a directory.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.add_entry(tar::EntryType::Directory, path, &[], None)
    }

    /// Appends a symlink pointing at `target`.
    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        self.add_entry(tar::EntryType::Symlink, path, &[], Some(target))
    }

    /// Appends a hardlink pointing at `target`.
    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        self.add_entry(tar::EntryType::Link, path, &[], Some(target))
    }

    /// Appends a regular file whose name is copied verbatim into an
    /// old-style header, so unsafe names such as `../escape` survive.
    ///
    /// # Panics
    ///
    /// Panics if `name` is longer than [`RAW_NAME_LIMIT`](Self::RAW_NAME_LIMIT).
    #[must_use]
    pub fn add_raw_file(mut self, name: &[u8], data: &[u8]) -> Self {
        assert!(
            name.len() <= Self::RAW_NAME_LIMIT,
            "raw entry name is {} bytes, limit is {}",
            name.len(),
            Self::RAW_NAME_LIMIT
        );
        let mut header = tar::Header::new_old();
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Finishes the archive and returns its bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
