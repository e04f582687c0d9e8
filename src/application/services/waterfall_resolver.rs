use crate::license_resolution::domain::{PackageIdentifier, PackageKey, PackageMetadata};
use crate::ports::outbound::{BatchResolution, BatchResolver, LicenseEnricher, LicenseResolver};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Maximum number of package resolutions in flight at once
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;

/// WaterfallResolver - license resolution across ordered sources
///
/// Each package goes through the index resolver first. When the index knows
/// a repository URL, the enricher is asked for a verified license file; its
/// result is adopted only if every license it reports is verified. A package
/// the index cannot resolve yields `None` and no other source is contacted.
///
/// The fallback resolver is owned for lifecycle purposes only. It needs an
/// SPDX id supplied from outside, which nothing in this chain provides, so it
/// is never called from [`WaterfallResolver::resolve`].
///
/// # Type Parameters
/// * `I` - Authoritative index resolver
/// * `E` - Source-host enricher
/// * `F` - Generic fallback resolver
pub struct WaterfallResolver<I, E, F> {
    index: I,
    enricher: E,
    fallback: F,
    max_concurrency: usize,
    closed: AtomicBool,
}

impl<I, E, F> WaterfallResolver<I, E, F>
where
    I: LicenseResolver,
    E: LicenseEnricher,
    F: LicenseResolver,
{
    pub fn new(index: I, enricher: E, fallback: F) -> Self {
        Self {
            index,
            enricher,
            fallback,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            closed: AtomicBool::new(false),
        }
    }

    /// Sets the concurrency ceiling (values below 1 are raised to 1)
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Resolver names ordered by ascending priority
    pub fn resolution_order(&self) -> Vec<&'static str> {
        let mut resolvers = [
            (self.index.priority(), self.index.name()),
            (self.enricher.priority(), self.enricher.name()),
            (self.fallback.priority(), self.fallback.name()),
        ];
        resolvers.sort();
        resolvers.iter().map(|(_, name)| *name).collect()
    }

    /// Runs the waterfall for a single package
    pub async fn resolve(&self, id: &PackageIdentifier) -> Option<PackageMetadata> {
        let Some(base) = self.index.resolve(id).await else {
            tracing::debug!(
                package = id.name(),
                version = id.version(),
                "No index metadata, giving up"
            );
            return None;
        };

        if base.repository_url().is_none() {
            return Some(base);
        }

        match self.enricher.enrich(id, &base).await {
            Some(enriched) if is_fully_verified(&enriched) => {
                tracing::debug!(
                    package = id.name(),
                    version = id.version(),
                    source = self.enricher.name(),
                    "Adopted verified license file"
                );
                Some(enriched)
            }
            _ => Some(base),
        }
    }

    /// Resolves one package, turning a panic into `None`
    async fn resolve_isolated(&self, id: &PackageIdentifier) -> Option<Arc<PackageMetadata>> {
        match AssertUnwindSafe(self.resolve(id)).catch_unwind().await {
            Ok(metadata) => metadata.map(Arc::new),
            Err(fault) => {
                tracing::error!(
                    package = id.name(),
                    version = id.version(),
                    fault = %panic_message(fault.as_ref()),
                    "Unexpected fault while resolving package"
                );
                None
            }
        }
    }
}

fn is_fully_verified(metadata: &PackageMetadata) -> bool {
    metadata.has_licenses()
        && metadata
            .licenses()
            .iter()
            .all(|license| license.is_verified_file())
}

fn panic_message(fault: &(dyn Any + Send)) -> String {
    if let Some(message) = fault.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = fault.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl<I, E, F> BatchResolver for WaterfallResolver<I, E, F>
where
    I: LicenseResolver,
    E: LicenseEnricher,
    F: LicenseResolver,
{
    async fn resolve_batch(&self, ids: &[PackageIdentifier]) -> BatchResolution {
        let mut seen = HashSet::new();
        let unique: Vec<PackageIdentifier> = ids
            .iter()
            .filter(|id| seen.insert(id.key()))
            .cloned()
            .collect();

        tracing::debug!(
            requested = ids.len(),
            unique = unique.len(),
            concurrency = self.max_concurrency,
            "Resolving batch"
        );

        let outcomes: HashMap<PackageKey, Option<Arc<PackageMetadata>>> = stream::iter(unique)
            .map(|id| async move {
                let outcome = self.resolve_isolated(&id).await;
                (id.key(), outcome)
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        ids.iter()
            .map(|id| {
                let outcome = outcomes.get(&id.key()).cloned().flatten();
                (id.clone(), outcome)
            })
            .collect()
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.index.close().await;
        self.enricher.close().await;
        self.fallback.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license_resolution::domain::LicenseReference;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeIndex {
        calls: AtomicUsize,
        closes: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl LicenseResolver for FakeIndex {
        fn name(&self) -> &'static str {
            "index"
        }

        fn priority(&self) -> u32 {
            10
        }

        async fn resolve(&self, id: &PackageIdentifier) -> Option<PackageMetadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match id.name() {
                "missing" => None,
                "boom" => panic!("index exploded"),
                "linked" => Some(
                    PackageMetadata::for_identifier(id)
                        .with_repository_url(Some("https://github.com/o/r".to_string()))
                        .with_licenses(vec![LicenseReference::spdx_reference("MIT", "MIT")]),
                ),
                _ => Some(
                    PackageMetadata::for_identifier(id)
                        .with_licenses(vec![LicenseReference::spdx_reference("MIT", "MIT")]),
                ),
            }
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeEnricher {
        verified: bool,
        calls: Mutex<Vec<String>>,
        closes: AtomicUsize,
    }

    #[async_trait]
    impl LicenseResolver for FakeEnricher {
        fn name(&self) -> &'static str {
            "host"
        }

        fn priority(&self) -> u32 {
            20
        }

        async fn resolve(&self, _id: &PackageIdentifier) -> Option<PackageMetadata> {
            None
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl LicenseEnricher for FakeEnricher {
        async fn enrich(
            &self,
            id: &PackageIdentifier,
            base: &PackageMetadata,
        ) -> Option<PackageMetadata> {
            self.calls.lock().unwrap().push(id.name().to_string());
            Some(base.replace_licenses(vec![LicenseReference::new(
                "MIT",
                "MIT License",
                "https://github.com/o/r/blob/main/LICENSE",
                self.verified,
            )]))
        }
    }

    #[derive(Default)]
    struct FakeFallback {
        closes: AtomicUsize,
    }

    #[async_trait]
    impl LicenseResolver for FakeFallback {
        fn name(&self) -> &'static str {
            "fallback"
        }

        fn priority(&self) -> u32 {
            1000
        }

        async fn resolve(&self, _id: &PackageIdentifier) -> Option<PackageMetadata> {
            None
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn waterfall(verified: bool) -> WaterfallResolver<FakeIndex, FakeEnricher, FakeFallback> {
        WaterfallResolver::new(
            FakeIndex::default(),
            FakeEnricher {
                verified,
                ..Default::default()
            },
            FakeFallback::default(),
        )
    }

    #[test]
    fn test_resolution_order_by_priority() {
        let resolver = WaterfallResolver::new(
            FakeFallback::default(),
            FakeEnricher::default(),
            FakeIndex::default(),
        );
        assert_eq!(resolver.resolution_order(), vec!["index", "host", "fallback"]);
    }

    #[test]
    fn test_max_concurrency_floor() {
        assert_eq!(waterfall(true).max_concurrency(), DEFAULT_MAX_CONCURRENCY);
        assert_eq!(waterfall(true).with_max_concurrency(0).max_concurrency(), 1);
    }

    #[tokio::test]
    async fn test_enrichment_skipped_without_repository() {
        let resolver = waterfall(true);
        let metadata = resolver
            .resolve(&PackageIdentifier::new("plain", "1.0"))
            .await
            .unwrap();
        assert!(!metadata.primary_license().unwrap().is_verified_file());
        assert!(resolver.enricher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verified_enrichment_adopted() {
        let resolver = waterfall(true);
        let metadata = resolver
            .resolve(&PackageIdentifier::new("linked", "1.0"))
            .await
            .unwrap();
        let license = metadata.primary_license().unwrap();
        assert!(license.is_verified_file());
        assert_eq!(license.url(), "https://github.com/o/r/blob/main/LICENSE");
    }

    #[tokio::test]
    async fn test_unverified_enrichment_discarded() {
        let resolver = waterfall(false);
        let metadata = resolver
            .resolve(&PackageIdentifier::new("linked", "1.0"))
            .await
            .unwrap();
        assert_eq!(
            metadata.primary_license().unwrap().url(),
            "https://spdx.org/licenses/MIT.html"
        );
        assert_eq!(resolver.enricher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_index_miss_stops_waterfall() {
        let resolver = waterfall(true);
        assert!(resolver
            .resolve(&PackageIdentifier::new("missing", "1.0"))
            .await
            .is_none());
        assert!(resolver.enricher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_isolates_panics() {
        let resolver = waterfall(true);
        let ids = vec![
            PackageIdentifier::new("w", "1.0"),
            PackageIdentifier::new("boom", "1.0"),
            PackageIdentifier::new("y", "1.0"),
        ];
        let results = resolver.resolve_batch(&ids).await;
        assert_eq!(results.len(), 3);
        assert!(results[&ids[0]].is_some());
        assert!(results[&ids[1]].is_none());
        assert!(results[&ids[2]].is_some());
    }

    #[tokio::test]
    async fn test_batch_deduplicates_by_name_and_version() {
        let resolver = waterfall(true);
        let a = PackageIdentifier::new("a", "1.0").with_source("poetry.lock");
        let a_other = PackageIdentifier::new("a", "1.0").with_source("requirements.txt");
        let b = PackageIdentifier::new("b", "2.0");
        let ids = vec![a.clone(), a.clone(), a_other.clone(), b.clone()];

        let results = resolver.resolve_batch(&ids).await;
        assert_eq!(resolver.index.calls.load(Ordering::SeqCst), 2);
        assert_eq!(results.len(), 3);

        let first = results[&a].as_ref().unwrap();
        let second = results[&a_other].as_ref().unwrap();
        assert!(Arc::ptr_eq(first, second));
        assert!(results[&b].is_some());
    }

    #[tokio::test]
    async fn test_batch_respects_concurrency_ceiling() {
        let resolver = waterfall(true).with_max_concurrency(2);
        let ids: Vec<_> = (0..10)
            .map(|i| PackageIdentifier::new(format!("pkg{}", i), "1.0"))
            .collect();
        let results = resolver.resolve_batch(&ids).await;
        assert_eq!(results.len(), 10);
        assert!(resolver.index.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let resolver = waterfall(true);
        assert!(resolver.resolve_batch(&[]).await.is_empty());
        assert_eq!(resolver.index.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let resolver = waterfall(true);
        resolver.close().await;
        resolver.close().await;
        assert_eq!(resolver.index.closes.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.enricher.closes.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.fallback.closes.load(Ordering::SeqCst), 1);
    }
}
