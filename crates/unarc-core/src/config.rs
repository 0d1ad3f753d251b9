//! Extraction configuration.

/// Default upper bound on steps taken by `extract_all`.
pub const DEFAULT_MAX_STEPS: usize = 8;

/// Configuration for extraction steps.
///
/// The defaults reproduce the plain step semantics: containers are unpacked
/// in place (a failed unpack may leave a partially populated directory) and
/// decompressed output overwrites whatever sits at the output path.
///
/// # Examples
///
/// ```
/// use unarc_core::ExtractConfig;
///
/// let config = ExtractConfig::default();
/// assert!(!config.atomic_unpack);
///
/// let strict = ExtractConfig::default()
///     .with_atomic_unpack(true)
///     .with_overwrite_existing(false);
/// assert!(strict.atomic_unpack);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Unpack into a hidden staging directory and rename it into place only
    /// after every entry was written.
    pub atomic_unpack: bool,

    /// Replace an existing file at the decompressed output path.
    pub overwrite_existing: bool,

    /// Maximum number of steps `extract_all` performs. The first step
    /// always runs, so zero behaves like one.
    pub max_steps: usize,
}

impl Default for ExtractConfig {
    /// Creates an `ExtractConfig` with default settings.
    ///
    /// Default values:
    /// - `atomic_unpack`: false
    /// - `overwrite_existing`: true
    /// - `max_steps`: 8
    fn default() -> Self {
        Self {
            atomic_unpack: false,
            overwrite_existing: true,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl ExtractConfig {
    /// Sets whether container steps are staged and renamed into place.
    #[must_use]
    pub const fn with_atomic_unpack(mut self, atomic: bool) -> Self {
        self.atomic_unpack = atomic;
        self
    }

    /// Sets whether decompressed output may replace an existing file.
    #[must_use]
    pub const fn with_overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    /// Sets the `extract_all` step limit.
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}
