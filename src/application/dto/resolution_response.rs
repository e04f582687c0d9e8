use crate::license_resolution::domain::{PackageIdentifier, PackageMetadata};
use crate::ports::outbound::BatchResolution;
use std::collections::HashSet;

/// ResolutionResponse - outcome of resolving every scanned dependency
#[derive(Debug, Clone, Default)]
pub struct ResolutionResponse {
    /// Identifiers in scan order, duplicates included
    pub packages: Vec<PackageIdentifier>,
    /// One entry per distinct identifier; `None` when nothing could be resolved
    pub resolved: BatchResolution,
    /// Identifiers answered from the cache
    pub cached_count: usize,
}

impl ResolutionResponse {
    pub fn new(packages: Vec<PackageIdentifier>, resolved: BatchResolution, cached_count: usize) -> Self {
        Self {
            packages,
            resolved,
            cached_count,
        }
    }

    /// Resolved metadata, one record per name and version, in scan order
    pub fn unique_metadata(&self) -> Vec<&PackageMetadata> {
        let mut seen = HashSet::new();
        self.packages
            .iter()
            .filter(|id| seen.insert(id.key()))
            .filter_map(|id| self.resolved.get(id).and_then(|m| m.as_deref()))
            .collect()
    }

    /// Distinct identifiers that resolved to nothing
    pub fn unresolved_count(&self) -> usize {
        let mut seen = HashSet::new();
        self.packages
            .iter()
            .filter(|id| seen.insert(id.key()))
            .filter(|id| !matches!(self.resolved.get(*id), Some(Some(_))))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_unique_metadata_collapses_provenance() {
        let a = PackageIdentifier::new("a", "1.0").with_source("poetry.lock");
        let a_req = PackageIdentifier::new("a", "1.0").with_source("requirements.txt");
        let b = PackageIdentifier::new("b", "1.0");
        let shared = Arc::new(PackageMetadata::for_identifier(&a));

        let mut resolved = BatchResolution::new();
        resolved.insert(a.clone(), Some(shared.clone()));
        resolved.insert(a_req.clone(), Some(shared));
        resolved.insert(b.clone(), None);

        let response = ResolutionResponse::new(vec![a, a_req, b], resolved, 0);
        let names: Vec<_> = response.unique_metadata().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["a"]);
        assert_eq!(response.unresolved_count(), 1);
    }
}
