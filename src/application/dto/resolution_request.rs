use std::path::PathBuf;

/// ResolutionRequest - input of the dependency resolution use case
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    /// Lock file or requirements file to scan
    pub lockfile_path: PathBuf,
}

impl ResolutionRequest {
    pub fn new(lockfile_path: PathBuf) -> Self {
        Self { lockfile_path }
    }
}
