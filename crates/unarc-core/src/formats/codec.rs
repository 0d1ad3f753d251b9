//! Compression codecs and the extension-keyed codec registry.
//!
//! Every codec is a one-shot transform from a compressed byte buffer to the
//! decompressed bytes. The registry maps a single, case-insensitive
//! extension token to one of these transforms; compound suffixes such as
//! `.tar.gz` are resolved as two separate steps.
//!
//! # Supported Codecs
//!
//! - **Xz** (`.xz`): xz container, LZMA2
//! - **Lzma** (`.lzma`): legacy LZMA-alone container
//! - **Bz2** (`.bz2`): bzip2, multi-stream aware
//! - **Gz** (`.gz`): gzip, multi-member aware

use std::collections::HashMap;
use std::io;
use std::io::Read;
use std::sync::LazyLock;

use crate::error::CodecError;
use crate::formats::tar::CONTAINER_EXTENSION;

/// One-shot decompression function.
pub type DecompressFn = fn(&[u8]) -> Result<Vec<u8>, CodecError>;

/// Built-in compression codecs.
///
/// # Examples
///
/// ```
/// use unarc_core::formats::Codec;
///
/// assert_eq!(Codec::from_extension("GZ"), Some(Codec::Gz));
/// assert_eq!(Codec::Xz.extension(), "xz");
/// assert_eq!(Codec::Bz2.name(), "bzip2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Xz container (LZMA2).
    Xz,
    /// Legacy LZMA-alone stream.
    Lzma,
    /// Bzip2.
    Bz2,
    /// Gzip.
    Gz,
}

impl Codec {
    /// All built-in codecs.
    pub const ALL: [Self; 4] = [Self::Xz, Self::Lzma, Self::Bz2, Self::Gz];

    /// Returns the extension token selecting this codec.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xz => "xz",
            Self::Lzma => "lzma",
            Self::Bz2 => "bz2",
            Self::Gz => "gz",
        }
    }

    /// Returns a human-readable name for this codec.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Xz => "xz",
            Self::Lzma => "lzma",
            Self::Bz2 => "bzip2",
            Self::Gz => "gzip",
        }
    }

    /// Resolves a built-in codec from an extension token, ignoring case.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|codec| codec.extension().eq_ignore_ascii_case(extension))
    }

    /// Returns the decompression function for this codec.
    #[must_use]
    pub const fn decompress_fn(self) -> DecompressFn {
        match self {
            Self::Xz => decompress_xz,
            Self::Lzma => decompress_lzma,
            Self::Bz2 => decompress_bz2,
            Self::Gz => decompress_gz,
        }
    }

    /// Decompresses a whole buffer.
    pub fn decompress(self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        (self.decompress_fn())(bytes)
    }
}

fn read_all(codec: Codec, mut decoder: impl Read) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CodecError::corrupt(codec.name(), e))?;
    Ok(out)
}

fn decompress_xz(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    read_all(Codec::Xz, xz2::read::XzDecoder::new_multi_decoder(bytes))
}

fn decompress_lzma(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let stream = xz2::stream::Stream::new_lzma_decoder(u64::MAX)
        .map_err(|e| CodecError::corrupt(Codec::Lzma.name(), io::Error::other(e)))?;
    read_all(Codec::Lzma, xz2::read::XzDecoder::new_stream(bytes, stream))
}

fn decompress_bz2(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    read_all(Codec::Bz2, bzip2::read::MultiBzDecoder::new(bytes))
}

fn decompress_gz(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    read_all(Codec::Gz, flate2::read::MultiGzDecoder::new(bytes))
}

/// A registered (extension, decompression function) pair.
#[derive(Debug, Clone)]
pub struct CodecEntry {
    extension: String,
    name: String,
    decompress: DecompressFn,
}

impl CodecEntry {
    /// Lowercase extension token.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Codec name used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the decompression function.
    pub fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        (self.decompress)(bytes)
    }
}

impl From<Codec> for CodecEntry {
    fn from(codec: Codec) -> Self {
        Self {
            extension: codec.extension().to_string(),
            name: codec.name().to_string(),
            decompress: codec.decompress_fn(),
        }
    }
}

static DEFAULT_REGISTRY: LazyLock<CodecRegistry> = LazyLock::new(CodecRegistry::with_defaults);

/// Extension-keyed table of codecs.
///
/// The process-wide default table is built once on first use and never
/// mutated. Callers wanting extra codecs build their own registry and hand it
/// to [`Extractor::with_registry`](crate::Extractor::with_registry).
///
/// # Examples
///
/// ```
/// use unarc_core::formats::CodecRegistry;
///
/// let registry = CodecRegistry::global();
/// assert!(registry.lookup("Bz2").is_some());
/// assert!(registry.lookup("zip").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    entries: HashMap<String, CodecEntry>,
}

impl CodecRegistry {
    /// Creates a registry without codecs.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Creates a registry holding the four built-in codecs.
    #[must_use]
    pub fn with_defaults() -> Self {
        let entries = Codec::ALL
            .into_iter()
            .map(|codec| (codec.extension().to_string(), CodecEntry::from(codec)))
            .collect();
        Self { entries }
    }

    /// Returns the shared read-only default registry.
    #[must_use]
    pub fn global() -> &'static Self {
        &DEFAULT_REGISTRY
    }

    /// Registers a codec, returning the entry it replaced.
    ///
    /// The extension may carry a leading dot and is stored lowercase.
    ///
    /// # Errors
    ///
    /// - `CodecError::InvalidExtension` if the token is empty or contains a
    ///   dot after the leading one
    /// - `CodecError::ReservedExtension` if the token names the container
    pub fn register(
        &mut self,
        extension: &str,
        name: &str,
        decompress: DecompressFn,
    ) -> Result<Option<CodecEntry>, CodecError> {
        let token = extension.strip_prefix('.').unwrap_or(extension);
        if token.is_empty() || token.contains('.') || token.contains('/') {
            return Err(CodecError::InvalidExtension(extension.to_string()));
        }
        let token = token.to_ascii_lowercase();
        if token == CONTAINER_EXTENSION {
            return Err(CodecError::ReservedExtension(token));
        }

        let entry = CodecEntry {
            extension: token.clone(),
            name: name.to_string(),
            decompress,
        };
        Ok(self.entries.insert(token, entry))
    }

    /// Looks up the codec for an extension token, ignoring case.
    #[must_use]
    pub fn lookup(&self, extension: &str) -> Option<&CodecEntry> {
        let found = self.entries.get(&extension.to_ascii_lowercase());
        tracing::trace!(extension, found = found.is_some(), "codec lookup");
        found
    }

    /// Returns `true` if a codec is registered for the extension.
    #[must_use]
    pub fn contains(&self, extension: &str) -> bool {
        self.entries.contains_key(&extension.to_ascii_lowercase())
    }

    /// Iterates over the registered extension tokens in no particular order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered codecs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no codec is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::compress;

    const PLAINTEXT: &[u8] = b"the quick brown fox jumps over the lazy dog\n";

    #[test]
    fn test_codec_extension() {
        assert_eq!(Codec::Xz.extension(), "xz");
        assert_eq!(Codec::Lzma.extension(), "lzma");
        assert_eq!(Codec::Bz2.extension(), "bz2");
        assert_eq!(Codec::Gz.extension(), "gz");
    }

    #[test]
    fn test_codec_name() {
        assert_eq!(Codec::Xz.name(), "xz");
        assert_eq!(Codec::Lzma.name(), "lzma");
        assert_eq!(Codec::Bz2.name(), "bzip2");
        assert_eq!(Codec::Gz.name(), "gzip");
    }

    #[test]
    fn test_from_extension_case_insensitive() {
        assert_eq!(Codec::from_extension("xz"), Some(Codec::Xz));
        assert_eq!(Codec::from_extension("LZMA"), Some(Codec::Lzma));
        assert_eq!(Codec::from_extension("bZ2"), Some(Codec::Bz2));
        assert_eq!(Codec::from_extension("Gz"), Some(Codec::Gz));
        assert_eq!(Codec::from_extension("tar"), None);
        assert_eq!(Codec::from_extension("tgz"), None);
    }

    #[test]
    fn test_every_codec_decompresses_its_own_format() {
        for codec in Codec::ALL {
            let compressed = compress(codec, PLAINTEXT);
            assert_eq!(codec.decompress(&compressed).unwrap(), PLAINTEXT, "{codec:?}");
        }
    }

    #[test]
    fn test_every_codec_rejects_garbage() {
        let garbage = vec![0xFF_u8; 64];
        for codec in Codec::ALL {
            match codec.decompress(&garbage) {
                Err(CodecError::Corrupt { codec: name, .. }) => assert_eq!(name, codec.name()),
                other => panic!("{codec:?} accepted garbage: {other:?}"),
            }
        }
    }

    #[test]
    fn test_gzip_multi_member() {
        let mut joined = compress(Codec::Gz, b"hello ");
        joined.extend(compress(Codec::Gz, b"world"));
        assert_eq!(Codec::Gz.decompress(&joined).unwrap(), b"hello world");
    }

    #[test]
    fn test_truncated_stream_rejected() {
        let compressed = compress(Codec::Xz, PLAINTEXT);
        let truncated = &compressed[..compressed.len() / 2];
        assert!(Codec::Xz.decompress(truncated).is_err());
    }

    #[test]
    fn test_default_registry_has_four_codecs() {
        let registry = CodecRegistry::with_defaults();
        assert_eq!(registry.len(), 4);
        let mut extensions: Vec<_> = registry.extensions().collect();
        extensions.sort_unstable();
        assert_eq!(extensions, ["bz2", "gz", "lzma", "xz"]);
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let registry = CodecRegistry::global();
        assert_eq!(registry.lookup("XZ").unwrap().name(), "xz");
        assert_eq!(registry.lookup("gz").unwrap().extension(), "gz");
        assert!(registry.contains("BZ2"));
        assert!(registry.lookup("tar").is_none());
        assert!(registry.lookup("tar.gz").is_none());
        assert!(registry.lookup("").is_none());
    }

    fn identity(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(bytes.to_vec())
    }

    #[test]
    fn test_register_custom_codec() {
        let mut registry = CodecRegistry::empty();
        assert!(registry.is_empty());

        let replaced = registry.register(".ID", "identity", identity).unwrap();
        assert!(replaced.is_none());
        let entry = registry.lookup("id").unwrap();
        assert_eq!(entry.name(), "identity");
        assert_eq!(entry.decompress(b"abc").unwrap(), b"abc");
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = CodecRegistry::with_defaults();
        let replaced = registry.register("gz", "identity", identity).unwrap();
        assert_eq!(replaced.unwrap().name(), "gzip");
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_register_rejects_container_token() {
        let mut registry = CodecRegistry::empty();
        assert!(matches!(
            registry.register("TAR", "nope", identity),
            Err(CodecError::ReservedExtension(ext)) if ext == "tar"
        ));
    }

    #[test]
    fn test_register_rejects_compound_and_empty() {
        let mut registry = CodecRegistry::empty();
        for bad in ["", ".", "tar.gz", ".tar.gz", "a/b"] {
            assert!(
                matches!(
                    registry.register(bad, "nope", identity),
                    Err(CodecError::InvalidExtension(_))
                ),
                "{bad:?} should be rejected"
            );
        }
        assert!(registry.is_empty());
    }
}
