use crate::license_resolution::domain::{PackageIdentifier, PackageMetadata};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of a batch resolution: one entry per input identifier.
///
/// Identifiers sharing a name and version share the same `Arc`.
pub type BatchResolution = HashMap<PackageIdentifier, Option<Arc<PackageMetadata>>>;

/// LicenseResolver port for a single license data source
///
/// Resolvers never fail towards the caller for ordinary conditions (not
/// found, network fault, malformed payload): they log the cause and return
/// `None`. Implementations must be `Send + Sync` so one instance can serve
/// many concurrent resolutions.
#[async_trait]
pub trait LicenseResolver: Send + Sync {
    /// Source name used in logs
    fn name(&self) -> &'static str;

    /// Lower values are tried earlier
    fn priority(&self) -> u32;

    /// Produces metadata for an identifier, or `None` if this source has none
    async fn resolve(&self, id: &PackageIdentifier) -> Option<PackageMetadata>;

    /// Releases the network session held by this resolver.
    ///
    /// Must be idempotent and safe to call on a resolver that never opened one.
    async fn close(&self) {}
}

/// A resolver that improves metadata produced by an earlier stage
#[async_trait]
pub trait LicenseEnricher: LicenseResolver {
    /// Returns a new record built from `base`, or `None` if nothing was found.
    /// `base` itself is never modified.
    async fn enrich(
        &self,
        id: &PackageIdentifier,
        base: &PackageMetadata,
    ) -> Option<PackageMetadata>;
}

/// BatchResolver port consumed by the cache-policy use case
#[async_trait]
pub trait BatchResolver: Send + Sync {
    /// Resolves every identifier; the result has exactly one entry per input
    async fn resolve_batch(&self, ids: &[PackageIdentifier]) -> BatchResolution;

    /// Closes every underlying network session
    async fn close(&self);
}
