//! license-tracker - open source license attribution for Python projects
//!
//! This library resolves the licenses of the pinned dependencies of a Python
//! project through an ordered waterfall of sources (the PyPI JSON API, then
//! license files on GitHub), caches the results in a local SQLite database,
//! renders a Markdown attribution document and checks license policies.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`license_resolution`): Package identity, license
//!   references, SPDX normalization and compliance policies
//! - **Application Layer** (`application`): The waterfall resolver and use cases
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use license_tracker::prelude::*;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<()> {
//! let scanner = scanner_for(&PathBuf::from("poetry.lock"))?;
//! let cache = SqliteLicenseCache::open_default()?;
//! let resolver = ResolverFactory::create(ResolverOptions::default());
//!
//! let use_case = ResolveDependenciesUseCase::new(
//!     scanner,
//!     Some(cache),
//!     resolver,
//!     StderrProgressReporter::new(),
//! );
//! let response = use_case
//!     .execute(ResolutionRequest::new(PathBuf::from("poetry.lock")))
//!     .await?;
//!
//! let document = MarkdownReporter::new().render(&response.unique_metadata(), None)?;
//! println!("{}", document);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod license_resolution;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::cache::{CacheInfo, SqliteLicenseCache};
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{FileSystemWriter, StdoutPresenter};
    pub use crate::adapters::outbound::formatters::MarkdownReporter;
    pub use crate::adapters::outbound::resolvers::{GitHubResolver, PyPiResolver, SpdxResolver};
    pub use crate::adapters::outbound::scanners::scanner_for;
    pub use crate::application::dto::{ResolutionRequest, ResolutionResponse};
    pub use crate::application::factories::{ResolverFactory, ResolverOptions};
    pub use crate::application::services::WaterfallResolver;
    pub use crate::application::use_cases::{CheckComplianceUseCase, ResolveDependenciesUseCase};
    pub use crate::license_resolution::domain::{
        LicenseReference, PackageIdentifier, PackageKey, PackageMetadata,
    };
    pub use crate::license_resolution::policies::{
        CompliancePolicy, ComplianceReport, SpdxNormalizer,
    };
    pub use crate::ports::outbound::{
        AttributionRenderer, BatchResolution, BatchResolver, DependencyScanner,
        LicenseCacheRepository, LicenseEnricher, LicenseResolver, OutputPresenter,
        ProgressReporter,
    };
    pub use crate::shared::Result;
}
