use license_tracker::prelude::*;
use std::path::Path;

/// Mock DependencyScanner returning a fixed list of identifiers
pub struct MockDependencyScanner {
    packages: Vec<PackageIdentifier>,
}

impl MockDependencyScanner {
    pub fn new(packages: &[(&str, &str)]) -> Self {
        Self {
            packages: packages
                .iter()
                .map(|(name, version)| PackageIdentifier::new(*name, *version).with_source("mock.lock"))
                .collect(),
        }
    }
}

impl DependencyScanner for MockDependencyScanner {
    fn source_name(&self) -> &'static str {
        "mock.lock"
    }

    fn can_handle(&self, path: &Path) -> bool {
        path.ends_with("mock.lock")
    }

    fn scan(&self, _path: &Path) -> Result<Vec<PackageIdentifier>> {
        Ok(self.packages.clone())
    }
}
