/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (registries, cache, file system, console).
pub mod attribution_renderer;
pub mod dependency_scanner;
pub mod license_cache_repository;
pub mod license_resolver;
pub mod output_presenter;
pub mod progress_reporter;

pub use attribution_renderer::AttributionRenderer;
pub use dependency_scanner::DependencyScanner;
pub use license_cache_repository::{CachedLicenses, LicenseCacheRepository};
pub use license_resolver::{BatchResolution, BatchResolver, LicenseEnricher, LicenseResolver};
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
