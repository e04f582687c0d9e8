use crate::license_resolution::domain::PackageIdentifier;
use crate::shared::Result;
use std::path::Path;

/// DependencyScanner port for reading package identifiers from a lock file
pub trait DependencyScanner {
    /// Tag attached to every identifier this scanner produces
    fn source_name(&self) -> &'static str;

    /// Whether this scanner understands the file, judged by its name
    fn can_handle(&self, path: &Path) -> bool;

    /// Reads the file and returns its pinned dependencies
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not in the expected format
    fn scan(&self, path: &Path) -> Result<Vec<PackageIdentifier>>;
}

impl<T: DependencyScanner + ?Sized> DependencyScanner for Box<T> {
    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }

    fn can_handle(&self, path: &Path) -> bool {
        (**self).can_handle(path)
    }

    fn scan(&self, path: &Path) -> Result<Vec<PackageIdentifier>> {
        (**self).scan(path)
    }
}
