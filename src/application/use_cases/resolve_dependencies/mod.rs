use crate::application::dto::{ResolutionRequest, ResolutionResponse};
use crate::license_resolution::domain::{LicenseReference, PackageIdentifier, PackageKey, PackageMetadata};
use crate::ports::outbound::{
    BatchResolution, BatchResolver, DependencyScanner, LicenseCacheRepository, ProgressReporter,
};
use crate::shared::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// ResolveDependenciesUseCase - scan, consult the cache, resolve the rest
///
/// Identifiers with a cached, non-empty license list never reach the
/// resolver. Everything the resolver returns with at least one license is
/// written back in a single batch. Cache failures are logged and the run
/// continues as if there were no cache.
///
/// # Type Parameters
/// * `S` - DependencyScanner implementation
/// * `C` - LicenseCacheRepository implementation
/// * `B` - BatchResolver implementation
/// * `PR` - ProgressReporter implementation
pub struct ResolveDependenciesUseCase<S, C, B, PR> {
    scanner: S,
    cache: Option<C>,
    resolver: B,
    progress_reporter: PR,
}

impl<S, C, B, PR> ResolveDependenciesUseCase<S, C, B, PR>
where
    S: DependencyScanner,
    C: LicenseCacheRepository,
    B: BatchResolver,
    PR: ProgressReporter,
{
    /// Creates the use case; pass `None` as cache to bypass it entirely
    pub fn new(scanner: S, cache: Option<C>, resolver: B, progress_reporter: PR) -> Self {
        Self {
            scanner,
            cache,
            resolver,
            progress_reporter,
        }
    }

    pub async fn execute(&self, request: ResolutionRequest) -> Result<ResolutionResponse> {
        self.progress_reporter.report(&format!(
            "📖 Scanning {} ({})",
            request.lockfile_path.display(),
            self.scanner.source_name()
        ));
        let packages = self.scanner.scan(&request.lockfile_path)?;
        self.progress_reporter
            .report(&format!("✅ Detected {} package(s)", packages.len()));

        if packages.is_empty() {
            self.resolver.close().await;
            return Ok(ResolutionResponse::new(packages, BatchResolution::new(), 0));
        }

        let mut resolved = self.lookup_cache(&packages);
        let cached_count = resolved.len();
        let total = packages.len();
        self.progress_reporter
            .report_progress(cached_count, total, Some("cached"));

        let misses: Vec<PackageIdentifier> = packages
            .iter()
            .filter(|id| !resolved.contains_key(*id))
            .cloned()
            .collect();

        if !misses.is_empty() {
            self.progress_reporter.report(&format!(
                "🔍 Resolving {} package(s) ({} from cache)",
                misses.len(),
                cached_count
            ));
            let fresh = self.resolver.resolve_batch(&misses).await;
            self.store_cache(&fresh);
            resolved.extend(fresh);
        }
        self.resolver.close().await;

        let response = ResolutionResponse::new(packages, resolved, cached_count);
        self.progress_reporter.report_completion(&format!(
            "✅ Resolved {} package(s), {} without license data",
            response.unique_metadata().len(),
            response.unresolved_count()
        ));
        Ok(response)
    }

    /// Cache hits as metadata; empty cached lists count as misses
    fn lookup_cache(&self, packages: &[PackageIdentifier]) -> BatchResolution {
        let Some(cache) = &self.cache else {
            return BatchResolution::new();
        };

        let hits = match cache.get_batch(packages) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "Cache lookup failed, resolving everything");
                self.progress_reporter
                    .report_error(&format!("⚠️ License cache unavailable, resolving every package: {}", e));
                return BatchResolution::new();
            }
        };

        let mut by_key: HashMap<PackageKey, Arc<PackageMetadata>> = HashMap::new();
        let mut resolved = BatchResolution::new();
        for (id, licenses) in hits {
            let Some(licenses) = licenses.filter(|l| !l.is_empty()) else {
                continue;
            };
            let metadata = by_key
                .entry(id.key())
                .or_insert_with(|| {
                    Arc::new(PackageMetadata::for_identifier(&id).with_licenses(licenses.to_vec()))
                })
                .clone();
            resolved.insert(id, Some(metadata));
        }
        tracing::debug!(hits = resolved.len(), "Cache lookup complete");
        resolved
    }

    fn store_cache(&self, fresh: &BatchResolution) {
        let Some(cache) = &self.cache else {
            return;
        };

        let entries: HashMap<PackageKey, Vec<LicenseReference>> = fresh
            .iter()
            .filter_map(|(id, metadata)| {
                let metadata = metadata.as_ref()?;
                metadata
                    .has_licenses()
                    .then(|| (id.key(), metadata.licenses().to_vec()))
            })
            .collect();

        if entries.is_empty() {
            return;
        }

        match cache.set_batch(&entries) {
            Ok(written) => tracing::debug!(written, "Stored resolved licenses in cache"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to store resolved licenses in cache");
                self.progress_reporter
                    .report_error(&format!("⚠️ Resolved licenses were not cached: {}", e));
            }
        }
    }
}
