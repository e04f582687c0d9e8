use crate::license_resolution::domain::{LicenseReference, PackageIdentifier};

/// Resolved metadata for one package version.
///
/// A value produced by a resolver is never modified afterwards: enrichment
/// steps build a new record through the consuming `with_*` methods or
/// [`PackageMetadata::replace_licenses`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageMetadata {
    name: String,
    version: String,
    description: Option<String>,
    homepage: Option<String>,
    repository_url: Option<String>,
    author: Option<String>,
    licenses: Vec<LicenseReference>,
    is_root_project: bool,
}

impl PackageMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Bare metadata for an identifier, with no fields resolved yet
    pub fn for_identifier(id: &PackageIdentifier) -> Self {
        Self::new(id.name(), id.version())
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_homepage(mut self, homepage: Option<String>) -> Self {
        self.homepage = homepage;
        self
    }

    pub fn with_repository_url(mut self, repository_url: Option<String>) -> Self {
        self.repository_url = repository_url;
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_licenses(mut self, licenses: Vec<LicenseReference>) -> Self {
        self.licenses = licenses;
        self
    }

    pub fn with_root_project(mut self, is_root_project: bool) -> Self {
        self.is_root_project = is_root_project;
        self
    }

    /// Copy of this record with every non-license field kept and the
    /// license list replaced.
    pub fn replace_licenses(&self, licenses: Vec<LicenseReference>) -> Self {
        Self {
            licenses,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    pub fn repository_url(&self) -> Option<&str> {
        self.repository_url.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn licenses(&self) -> &[LicenseReference] {
        &self.licenses
    }

    pub fn is_root_project(&self) -> bool {
        self.is_root_project
    }

    /// The first license, which reports treat as the primary one
    pub fn primary_license(&self) -> Option<&LicenseReference> {
        self.licenses.first()
    }

    pub fn has_licenses(&self) -> bool {
        !self.licenses.is_empty()
    }
}
