//! Staged container unpacking.

use std::fs;

use tracing::debug;
use tracing::warn;

use crate::error::UnpackError;
use crate::formats::TarContainer;
use crate::report::UnpackReport;
use crate::types::DestinationRoot;

const STAGING_PREFIX: &str = ".unarc-staging-";

/// Unpacks into a hidden staging directory, then renames it to `destination`.
///
/// The staging directory lives in the destination's parent so the final
/// rename never crosses filesystems. If any entry fails, the staging
/// directory is removed and `destination` is never created.
///
/// # Errors
///
/// Same as [`unpack`](crate::formats::tar::unpack). A failed rename is
/// reported as `UnpackError::FilesystemFailure` on the destination path.
pub fn unpack_staged(
    container_bytes: &[u8],
    destination: &DestinationRoot,
) -> Result<UnpackReport, UnpackError> {
    let mut container = TarContainer::open(container_bytes)?;

    let parent = destination.parent();
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| UnpackError::filesystem(parent, e))?;
    debug!(staging = %staging.path().display(), "unpacking into staging directory");

    let mut report = container.unpack_into(staging.path())?;

    let staged = staging.keep();
    if let Err(e) = fs::rename(&staged, destination.as_path()) {
        if let Err(cleanup) = fs::remove_dir_all(&staged) {
            warn!(
                staging = %staged.display(),
                error = %cleanup,
                "failed to remove staging directory"
            );
        }
        return Err(UnpackError::filesystem(destination.as_path(), e));
    }

    report.destination = destination.as_path().to_path_buf();
    Ok(report)
}
