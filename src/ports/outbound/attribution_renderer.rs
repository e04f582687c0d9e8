use crate::license_resolution::domain::PackageMetadata;
use crate::shared::Result;

/// AttributionRenderer port for turning resolved metadata into a document
pub trait AttributionRenderer {
    /// Renders the attribution document
    ///
    /// # Arguments
    /// * `packages` - Resolved packages, in any order
    /// * `root_project` - Optional metadata of the scanned project itself
    fn render(
        &self,
        packages: &[&PackageMetadata],
        root_project: Option<&PackageMetadata>,
    ) -> Result<String>;
}
