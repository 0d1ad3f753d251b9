//! Step-wise extraction driver.

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::Result;
use crate::extraction::atomic::unpack_staged;
use crate::formats::CodecEntry;
use crate::formats::CodecRegistry;
use crate::formats::tar::CONTAINER_EXTENSION;
use crate::formats::tar::unpack;
use crate::report::ExtractionReport;
use crate::report::UnpackReport;
use crate::types::DestinationRoot;

/// Outcome of one successful extraction step.
#[derive(Debug, Clone)]
pub enum ExtractStep {
    /// A codec decompressed the input into a sibling file.
    Decompressed {
        /// Input path with its trailing extension removed.
        location: PathBuf,
        /// Name of the codec that ran.
        codec: String,
        /// Size of the decompressed output.
        bytes_written: u64,
        /// Whether the new location names another codec or the container.
        may_continue: bool,
    },

    /// A tar container was unpacked into a fresh directory.
    Unpacked(UnpackReport),
}

impl ExtractStep {
    /// Location produced by this step.
    #[must_use]
    pub fn location(&self) -> &Path {
        match self {
            Self::Decompressed { location, .. } => location,
            Self::Unpacked(report) => &report.destination,
        }
    }

    /// Consumes the step, returning its location.
    #[must_use]
    pub fn into_location(self) -> PathBuf {
        match self {
            Self::Decompressed { location, .. } => location,
            Self::Unpacked(report) => report.destination,
        }
    }

    /// Returns `true` if calling `extract` again on the new location may do
    /// more work.
    ///
    /// An unpacked directory is always final.
    #[must_use]
    pub const fn may_continue(&self) -> bool {
        match self {
            Self::Decompressed { may_continue, .. } => *may_continue,
            Self::Unpacked(_) => false,
        }
    }

    /// Returns the unpack report if this step unpacked a container.
    #[must_use]
    pub const fn unpack_report(&self) -> Option<&UnpackReport> {
        match self {
            Self::Unpacked(report) => Some(report),
            Self::Decompressed { .. } => None,
        }
    }
}

/// Extraction driver bound to a codec registry.
///
/// # Examples
///
/// ```no_run
/// use unarc_core::ExtractConfig;
/// use unarc_core::Extractor;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = Extractor::new(ExtractConfig::default());
/// let mut location = std::path::PathBuf::from("photo.tar.gz");
/// loop {
///     let step = extractor.extract(&location)?;
///     let more = step.may_continue();
///     location = step.into_location();
///     if !more {
///         break;
///     }
/// }
/// println!("extracted to {}", location.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Extractor<'r> {
    config: ExtractConfig,
    registry: &'r CodecRegistry,
}

impl Extractor<'static> {
    /// Creates an extractor using the process-wide default codec registry.
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self::with_registry(config, CodecRegistry::global())
    }
}

impl Default for Extractor<'static> {
    fn default() -> Self {
        Self::new(ExtractConfig::default())
    }
}

impl<'r> Extractor<'r> {
    /// Creates an extractor using a caller-supplied codec registry.
    #[must_use]
    pub const fn with_registry(config: ExtractConfig, registry: &'r CodecRegistry) -> Self {
        Self { config, registry }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Performs exactly one extraction step on `location`.
    ///
    /// The input file is never modified or removed.
    ///
    /// # Errors
    ///
    /// - `ExtractionError::UnsupportedExtension` if no step applies; this is
    ///   also how a finished extraction presents itself
    /// - `ExtractionError::Io` if the input cannot be read or the output
    ///   cannot be written
    /// - `ExtractionError::CodecFailed` if the codec rejects the input
    /// - `ExtractionError::ContainerFailed` if unpacking fails
    #[tracing::instrument(skip(self))]
    pub fn extract(&self, location: &Path) -> Result<ExtractStep> {
        let extension = extension_token(location);

        if let Some(entry) = self.registry.lookup(&extension) {
            return self.decompress(location, entry);
        }
        if extension == CONTAINER_EXTENSION {
            return self.unpack(location);
        }

        debug!(extension, "no step applies");
        Err(ExtractionError::UnsupportedExtension(extension))
    }

    /// Repeats [`extract`](Self::extract) until no further step applies.
    ///
    /// The first step always runs. Once `config.max_steps` steps are done
    /// (a limit of zero counts as one) and more work remains, the report is
    /// returned marked truncated.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step. A path that no step
    /// applies to at all fails with `UnsupportedExtension`.
    pub fn extract_all(&self, path: &Path) -> Result<ExtractionReport> {
        let start = Instant::now();
        let mut report = ExtractionReport::new(path.to_path_buf());
        let limit = self.config.max_steps.max(1);

        loop {
            let step = self.extract(&report.location)?;
            let more = step.may_continue();
            report.location = step.location().to_path_buf();
            report.steps.push(step);
            if !more {
                break;
            }
            if report.steps.len() >= limit {
                report.truncated = true;
                break;
            }
        }

        report.duration = start.elapsed();
        Ok(report)
    }

    /// Returns `true` if some step applies to `location`.
    #[must_use]
    pub fn is_extractable(&self, location: &Path) -> bool {
        let extension = extension_token(location);
        extension == CONTAINER_EXTENSION || self.registry.contains(&extension)
    }

    fn decompress(&self, location: &Path, entry: &CodecEntry) -> Result<ExtractStep> {
        let output = location.with_extension("");
        let input = fs::read(location).map_err(|e| ExtractionError::io(location, e))?;

        let decompressed = entry
            .decompress(&input)
            .map_err(|source| ExtractionError::CodecFailed {
                extension: entry.extension().to_string(),
                source,
            })?;

        let mut options = OpenOptions::new();
        options.write(true);
        if self.config.overwrite_existing {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        options
            .open(&output)
            .and_then(|mut file| file.write_all(&decompressed))
            .map_err(|e| ExtractionError::io(&output, e))?;

        debug!(
            codec = entry.name(),
            input = %location.display(),
            output = %output.display(),
            bytes = decompressed.len(),
            "decompressed"
        );

        let may_continue = self.is_extractable(&output);
        Ok(ExtractStep::Decompressed {
            location: output,
            codec: entry.name().to_string(),
            bytes_written: decompressed.len() as u64,
            may_continue,
        })
    }

    fn unpack(&self, location: &Path) -> Result<ExtractStep> {
        let bytes = fs::read(location).map_err(|e| ExtractionError::io(location, e))?;
        let destination = DestinationRoot::unique_in(parent_dir(location));

        let report = if self.config.atomic_unpack {
            unpack_staged(&bytes, &destination)?
        } else {
            unpack(&bytes, destination.as_path())?
        };

        debug!(
            input = %location.display(),
            destination = %report.destination.display(),
            files = report.files_written,
            "unpacked container"
        );
        Ok(ExtractStep::Unpacked(report))
    }
}

/// Lowercased final extension of `path`, or an empty string if it has none.
fn extension_token(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::error::UnpackError;
    use crate::formats::Codec;
    use crate::test_utils::TarTestBuilder;
    use crate::test_utils::compress;
    use tempfile::TempDir;

    #[test]
    fn test_extension_token() {
        assert_eq!(extension_token(Path::new("a/photo.tar.GZ")), "gz");
        assert_eq!(extension_token(Path::new("photo.tar")), "tar");
        assert_eq!(extension_token(Path::new("README")), "");
        assert_eq!(extension_token(Path::new(".gz")), "");
        assert_eq!(extension_token(Path::new("dir/")), "");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("a/b.tar")), Path::new("a"));
        assert_eq!(parent_dir(Path::new("b.tar")), Path::new("."));
    }

    #[test]
    fn test_decompress_step_strips_extension() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("data.txt.bz2");
        fs::write(&input, compress(Codec::Bz2, b"payload")).unwrap();

        let step = Extractor::default().extract(&input).unwrap();

        assert_eq!(step.location(), temp.path().join("data.txt"));
        assert!(!step.may_continue());
        assert!(matches!(
            &step,
            ExtractStep::Decompressed { codec, bytes_written: 7, .. } if codec == "bzip2"
        ));
        assert_eq!(fs::read(step.location()).unwrap(), b"payload");
    }

    #[test]
    fn test_uppercase_extension_matches() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("DATA.XZ");
        fs::write(&input, compress(Codec::Xz, b"shout")).unwrap();

        let step = Extractor::default().extract(&input).unwrap();
        assert_eq!(step.location(), temp.path().join("DATA"));
    }

    #[test]
    fn test_uppercase_tar_extension() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("APP.TAR");
        fs::write(&input, TarTestBuilder::new().add_file("bin/app", b"elf").build()).unwrap();

        let step = Extractor::default().extract(&input).unwrap();

        assert!(step.unpack_report().is_some());
        assert_eq!(step.location().parent(), Some(temp.path()));
        assert_eq!(fs::read(step.location().join("bin/app")).unwrap(), b"elf");
        assert!(Extractor::default().is_extractable(&input));
    }

    #[test]
    fn test_may_continue_after_outer_codec() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("pkg.tar.lzma");
        fs::write(&input, compress(Codec::Lzma, &TarTestBuilder::new().build())).unwrap();

        let step = Extractor::default().extract(&input).unwrap();
        assert!(step.may_continue());
        assert!(step.unpack_report().is_none());
    }

    #[test]
    fn test_unsupported_extension_leaves_input() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("notes.zip");
        fs::write(&input, b"PK").unwrap();

        let err = Extractor::default().extract(&input).unwrap_err();
        assert_eq!(err.unsupported_extension(), Some("zip"));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_input_is_io() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("absent.gz");

        let err = Extractor::default().extract(&input).unwrap_err();
        assert!(matches!(err, ExtractionError::Io { ref path, .. } if *path == input));
    }

    #[test]
    fn test_corrupt_input_is_codec_failed() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("broken.gz");
        fs::write(&input, b"this is not gzip").unwrap();

        let err = Extractor::default().extract(&input).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::CodecFailed { ref extension, source: CodecError::Corrupt { .. } }
                if extension == "gz"
        ));
        assert!(!temp.path().join("broken").exists());
    }

    #[test]
    fn test_malformed_tar_is_container_failed() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("broken.tar");
        fs::write(&input, [0x5A_u8; 1024]).unwrap();

        let err = Extractor::default().extract(&input).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::ContainerFailed(UnpackError::MalformedContainer(_))
        ));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_overwrite_disabled_refuses_existing_output() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("data.gz");
        let output = temp.path().join("data");
        fs::write(&input, compress(Codec::Gz, b"new")).unwrap();
        fs::write(&output, b"old").unwrap();

        let extractor = Extractor::new(ExtractConfig::default().with_overwrite_existing(false));
        let err = extractor.extract(&input).unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::AlreadyExists
        ));
        assert_eq!(fs::read(&output).unwrap(), b"old");
    }

    #[test]
    fn test_overwrite_enabled_replaces_output() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("data.gz");
        let output = temp.path().join("data");
        fs::write(&input, compress(Codec::Gz, b"new")).unwrap();
        fs::write(&output, b"old and longer").unwrap();

        Extractor::default().extract(&input).unwrap();
        assert_eq!(fs::read(&output).unwrap(), b"new");
    }

    fn reverse(bytes: &[u8]) -> std::result::Result<Vec<u8>, CodecError> {
        Ok(bytes.iter().rev().copied().collect())
    }

    #[test]
    fn test_custom_registry() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("msg.rev");
        fs::write(&input, b"olleh").unwrap();

        let mut registry = CodecRegistry::empty();
        registry.register("rev", "reverse", reverse).unwrap();
        let extractor = Extractor::with_registry(ExtractConfig::default(), &registry);

        let step = extractor.extract(&input).unwrap();
        assert_eq!(fs::read(step.location()).unwrap(), b"hello");

        // The empty registry no longer knows gzip.
        let gz = temp.path().join("x.gz");
        fs::write(&gz, compress(Codec::Gz, b"x")).unwrap();
        assert!(extractor.extract(&gz).unwrap_err().is_unsupported_extension());
    }

    #[test]
    fn test_extract_all_truncates_at_limit() {
        let temp = TempDir::new().unwrap();
        let inner = compress(Codec::Gz, &TarTestBuilder::new().build());
        let input = temp.path().join("nested.tar.gz.gz");
        fs::write(&input, compress(Codec::Gz, &inner)).unwrap();

        let extractor = Extractor::new(ExtractConfig::default().with_max_steps(1));
        let report = extractor.extract_all(&input).unwrap();

        assert!(report.truncated);
        assert_eq!(report.step_count(), 1);
        assert_eq!(report.location, temp.path().join("nested.tar.gz"));
    }

    #[test]
    fn test_extract_all_zero_limit_still_rejects_unsupported() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("notes.zip");
        fs::write(&input, b"PK").unwrap();

        let extractor = Extractor::new(ExtractConfig::default().with_max_steps(0));
        let err = extractor.extract_all(&input).unwrap_err();

        assert_eq!(err.unsupported_extension(), Some("zip"));
    }

    #[test]
    fn test_extract_all_zero_limit_runs_one_step() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("data.txt.gz.gz");
        fs::write(&input, compress(Codec::Gz, &compress(Codec::Gz, b"x"))).unwrap();

        let extractor = Extractor::new(ExtractConfig::default().with_max_steps(0));
        let report = extractor.extract_all(&input).unwrap();

        assert_eq!(report.step_count(), 1);
        assert!(report.truncated);
        assert_eq!(report.location, temp.path().join("data.txt.gz"));
    }

    #[test]
    fn test_extract_all_not_truncated_when_finished_at_limit() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("data.txt.gz");
        fs::write(&input, compress(Codec::Gz, b"x")).unwrap();

        let extractor = Extractor::new(ExtractConfig::default().with_max_steps(1));
        let report = extractor.extract_all(&input).unwrap();

        assert_eq!(report.step_count(), 1);
        assert!(!report.truncated);
    }

    #[test]
    fn test_atomic_step_unpacks() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("app.tar");
        fs::write(&input, TarTestBuilder::new().add_file("f", b"1").build()).unwrap();

        let extractor = Extractor::new(ExtractConfig::default().with_atomic_unpack(true));
        let step = extractor.extract(&input).unwrap();

        assert!(step.location().is_dir());
        assert_eq!(step.location().parent(), Some(temp.path()));
        assert_eq!(fs::read(step.location().join("f")).unwrap(), b"1");
    }
}
