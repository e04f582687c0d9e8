pub mod license_reference;
pub mod package_identifier;
pub mod package_metadata;

pub use license_reference::{spdx_reference_url, LicenseReference};
pub use package_identifier::{PackageIdentifier, PackageKey};
pub use package_metadata::PackageMetadata;
