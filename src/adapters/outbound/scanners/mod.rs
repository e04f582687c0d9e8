/// Lock file scanners and file-name based auto-detection
mod pipenv;
mod poetry;
mod requirements;

pub use pipenv::PipenvScanner;
pub use poetry::PoetryScanner;
pub use requirements::RequirementsScanner;

use crate::ports::outbound::DependencyScanner;
use crate::shared::error::LicenseTrackerError;
use crate::shared::Result;
use std::path::Path;

pub const SUPPORTED_FILES: &str = "poetry.lock, Pipfile.lock, requirements*.txt";

/// Picks the scanner for `path` by file name, trying poetry.lock,
/// Pipfile.lock and requirements files in that order.
///
/// # Errors
/// Returns [`LicenseTrackerError::UnsupportedLockfile`] if no scanner matches.
pub fn scanner_for(path: &Path) -> Result<Box<dyn DependencyScanner>> {
    let scanners: Vec<Box<dyn DependencyScanner>> = vec![
        Box::new(PoetryScanner::new()),
        Box::new(PipenvScanner::new()),
        Box::new(RequirementsScanner::new()),
    ];

    scanners
        .into_iter()
        .find(|scanner| scanner.can_handle(path))
        .ok_or_else(|| {
            LicenseTrackerError::UnsupportedLockfile {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                supported: SUPPORTED_FILES.to_string(),
            }
            .into()
        })
}
