use crate::license_resolution::domain::{LicenseReference, PackageIdentifier, PackageKey};
use crate::shared::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// License list shared by every identifier with the same name and version
pub type CachedLicenses = Arc<Vec<LicenseReference>>;

/// LicenseCacheRepository port for the persistent license cache
///
/// Only license lists are cached; other metadata is fetched on every run.
pub trait LicenseCacheRepository {
    /// Looks up every identifier in one pass.
    ///
    /// The result covers every input identifier; misses and expired records
    /// map to `None`.
    fn get_batch(
        &self,
        ids: &[PackageIdentifier],
    ) -> Result<HashMap<PackageIdentifier, Option<CachedLicenses>>>;

    /// Upserts all entries in one transaction and returns how many were written
    fn set_batch(&self, entries: &HashMap<PackageKey, Vec<LicenseReference>>) -> Result<usize>;
}
