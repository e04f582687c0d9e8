use super::http_session::{HttpSession, DEFAULT_REQUEST_TIMEOUT};
use crate::license_resolution::domain::{PackageIdentifier, PackageMetadata};
use crate::license_resolution::policies::SpdxNormalizer;
use crate::ports::outbound::LicenseResolver;
use crate::shared::error::ResolverError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_PYPI_BASE_URL: &str = "https://pypi.org";

const SOURCE_NAME: &str = "PyPI";

/// `project_urls` keys that may hold the source repository, in preference order
const REPOSITORY_URL_KEYS: &[&str] = &[
    "Source",
    "Repository",
    "Source Code",
    "source",
    "repository",
    "Code",
    "GitHub",
    "GitLab",
];

const SOURCE_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org"];

#[derive(Debug, Deserialize)]
struct PyPiPackageInfo {
    info: PyPiInfo,
}

#[derive(Debug, Deserialize)]
struct PyPiInfo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    home_page: Option<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    license_expression: Option<String>,
    #[serde(default)]
    classifiers: Option<Vec<String>>,
    #[serde(default)]
    project_urls: Option<HashMap<String, Option<String>>>,
}

/// PyPiResolver adapter for the PyPI JSON API
///
/// The authoritative first step of the waterfall: looks up one exact
/// `name==version` and extracts description, homepage, author, a candidate
/// source repository URL, and at most one normalized (unverified) license.
///
/// Failures are never retried. 404 is logged at debug level, any other
/// status, network fault or unparsable body at error level; all of them
/// produce `None`.
pub struct PyPiResolver {
    session: HttpSession,
    base_url: String,
    normalizer: SpdxNormalizer,
}

impl PyPiResolver {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            session: HttpSession::new(timeout),
            base_url: DEFAULT_PYPI_BASE_URL.to_string(),
            normalizer: SpdxNormalizer::new(),
        }
    }

    /// Points the resolver at another index (e.g. a mirror)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Validates a name or version before it is placed in a URL path
    fn validate_url_component(component: &str, component_type: &str) -> Result<(), ResolverError> {
        if component.is_empty() {
            return Err(ResolverError::InvalidInput(format!(
                "{} is empty",
                component_type
            )));
        }

        if component.contains('/') || component.contains('\\') {
            return Err(ResolverError::InvalidInput(format!(
                "{} contains path separators",
                component_type
            )));
        }

        if component.contains("..") {
            return Err(ResolverError::InvalidInput(format!(
                "{} contains '..'",
                component_type
            )));
        }

        if component.contains('#') || component.contains('?') || component.contains('@') {
            return Err(ResolverError::InvalidInput(format!(
                "{} contains URL-unsafe characters",
                component_type
            )));
        }

        Ok(())
    }

    fn metadata_url(&self, id: &PackageIdentifier) -> Result<String, ResolverError> {
        Self::validate_url_component(id.name(), "Package name")?;
        Self::validate_url_component(id.version(), "Version")?;

        Ok(format!(
            "{}/pypi/{}/{}/json",
            self.base_url,
            urlencoding::encode(id.name()),
            urlencoding::encode(id.version())
        ))
    }

    async fn fetch(&self, id: &PackageIdentifier) -> Result<PackageMetadata, ResolverError> {
        let url = self.metadata_url(id)?;
        tracing::debug!(url = %url, "Fetching PyPI metadata");

        let client = self.session.client()?;
        let response = client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(ResolverError::NotFound {
                    resource: format!("{} on PyPI", id),
                })
            }
            status => {
                return Err(ResolverError::UnexpectedStatus {
                    source_name: SOURCE_NAME,
                    status: status.as_u16(),
                })
            }
        }

        let body = response.text().await?;
        self.parse_response(&body, id)
    }

    /// Parses a PyPI JSON API body into metadata for `id`.
    ///
    /// Name and version come from the response when present, otherwise from `id`.
    pub fn parse_response(
        &self,
        body: &str,
        id: &PackageIdentifier,
    ) -> Result<PackageMetadata, ResolverError> {
        let package: PyPiPackageInfo = serde_json::from_str(body)
            .map_err(|e| ResolverError::MalformedResponse(e.to_string()))?;
        let info = package.info;

        let classifiers = info.classifiers.unwrap_or_default();
        let licenses = self.normalizer.select_licenses(
            info.license.as_deref(),
            info.license_expression.as_deref(),
            &classifiers,
        );
        let repository_url = info
            .project_urls
            .as_ref()
            .and_then(extract_repository_url);

        Ok(PackageMetadata::new(
            non_empty(info.name).unwrap_or_else(|| id.name().to_string()),
            non_empty(info.version).unwrap_or_else(|| id.version().to_string()),
        )
        .with_description(non_empty(info.summary))
        .with_homepage(non_empty(info.home_page))
        .with_author(non_empty(info.author))
        .with_repository_url(repository_url)
        .with_licenses(licenses))
    }
}

impl Default for PyPiResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LicenseResolver for PyPiResolver {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn priority(&self) -> u32 {
        10
    }

    async fn resolve(&self, id: &PackageIdentifier) -> Option<PackageMetadata> {
        match self.fetch(id).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                e.log(SOURCE_NAME, id.name(), id.version());
                None
            }
        }
    }

    async fn close(&self) {
        if self.session.close() {
            tracing::debug!("Closed PyPI session");
        }
    }
}

/// First `project_urls` entry, by key preference, that points at a known source host
fn extract_repository_url(project_urls: &HashMap<String, Option<String>>) -> Option<String> {
    REPOSITORY_URL_KEYS.iter().find_map(|key| {
        let url = project_urls.get(*key)?.as_deref()?;
        let lower = url.to_lowercase();
        SOURCE_HOSTS
            .iter()
            .any(|host| lower.contains(host))
            .then(|| url.to_string())
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
