use super::http_session::{HttpSession, DEFAULT_REQUEST_TIMEOUT};
use crate::license_resolution::domain::{LicenseReference, PackageIdentifier, PackageMetadata};
use crate::ports::outbound::{LicenseEnricher, LicenseResolver};
use crate::shared::error::ResolverError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, RETRY_AFTER};
use reqwest::StatusCode;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Retries after the first rate-limited response (4 attempts in total)
pub const MAX_RATE_LIMIT_RETRIES: u32 = 3;

const SOURCE_NAME: &str = "GitHub";

#[derive(Debug, Deserialize)]
struct GitHubLicenseResponse {
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    license: Option<GitHubLicense>,
}

#[derive(Debug, Deserialize)]
struct GitHubLicense {
    #[serde(default)]
    spdx_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Result of one rate-limit aware attempt
#[derive(Debug)]
pub enum Attempt<T> {
    RateLimited { retry_after: Option<u64> },
    Done(T),
}

/// Runs `attempt` until it is not rate limited, sleeping between attempts.
///
/// The wait is the server's `Retry-After` in seconds when given, otherwise
/// `2^retry` seconds (1s, 2s, 4s). After `max_retries` retries the last
/// rate-limited attempt turns into [`ResolverError::RateLimited`].
pub async fn retry_rate_limited<T, F, Fut>(
    max_retries: u32,
    mut attempt: F,
) -> Result<T, ResolverError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Attempt<T>, ResolverError>>,
{
    let mut retries = 0;
    loop {
        match attempt().await? {
            Attempt::Done(value) => return Ok(value),
            Attempt::RateLimited { retry_after } => {
                if retries >= max_retries {
                    return Err(ResolverError::RateLimited {
                        source_name: SOURCE_NAME,
                        attempts: retries + 1,
                    });
                }
                let wait = retry_after.unwrap_or(1u64 << retries);
                tracing::debug!(retry = retries + 1, wait_secs = wait, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_secs(wait)).await;
                retries += 1;
            }
        }
    }
}

/// GitHubResolver adapter for the GitHub repository license API
///
/// Cannot resolve from an identifier alone; its work happens in
/// [`LicenseEnricher::enrich`], which needs a GitHub repository URL on the
/// metadata from an earlier stage. The license it returns is a verified
/// file link, with the SPDX id and name taken verbatim from GitHub.
pub struct GitHubResolver {
    session: HttpSession,
    base_url: String,
    token: Option<String>,
}

impl GitHubResolver {
    pub fn new(token: Option<String>) -> Self {
        Self::with_timeout(token, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(token: Option<String>, timeout: Duration) -> Self {
        Self {
            session: HttpSession::new(timeout),
            base_url: DEFAULT_GITHUB_API_URL.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn fetch_license(&self, owner: &str, repo: &str) -> Result<LicenseReference, ResolverError> {
        let url = format!(
            "{}/repos/{}/{}/license",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        tracing::debug!(url = %url, "Fetching GitHub license");

        let client = self.session.client()?;
        let client = &client;
        let url = url.as_str();
        let token = self.token.as_deref();

        retry_rate_limited(MAX_RATE_LIMIT_RETRIES, move || async move {
            let mut request = client.get(url).header(ACCEPT, "application/vnd.github+json");
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }
            let response = request.send().await?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.text().await?;
                    parse_license_response(&body).map(Attempt::Done)
                }
                StatusCode::FORBIDDEN => Ok(Attempt::RateLimited {
                    retry_after: parse_retry_after(response.headers()),
                }),
                StatusCode::NOT_FOUND => Err(ResolverError::NotFound {
                    resource: format!("license file for {}/{}", owner, repo),
                }),
                status => Err(ResolverError::UnexpectedStatus {
                    source_name: SOURCE_NAME,
                    status: status.as_u16(),
                }),
            }
        })
        .await
    }
}

#[async_trait]
impl LicenseResolver for GitHubResolver {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn priority(&self) -> u32 {
        80
    }

    /// Always `None`: a repository URL is required, see [`LicenseEnricher::enrich`]
    async fn resolve(&self, _id: &PackageIdentifier) -> Option<PackageMetadata> {
        None
    }

    async fn close(&self) {
        if self.session.close() {
            tracing::debug!("Closed GitHub session");
        }
    }
}

#[async_trait]
impl LicenseEnricher for GitHubResolver {
    async fn enrich(
        &self,
        id: &PackageIdentifier,
        base: &PackageMetadata,
    ) -> Option<PackageMetadata> {
        let (owner, repo) = parse_github_url(base.repository_url()?)?;

        match self.fetch_license(&owner, &repo).await {
            Ok(license) => Some(base.replace_licenses(vec![license])),
            Err(e) => {
                e.log(SOURCE_NAME, id.name(), id.version());
                None
            }
        }
    }
}

/// Extracts `(owner, repo)` from a `github.com` repository URL.
///
/// The host must be `github.com` or `www.github.com`, compared exactly.
/// The path must be exactly two non-empty segments once surrounding slashes
/// and a trailing `.git` are removed.
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let (_, rest) = url.split_once("://")?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let (host, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };

    if host != "github.com" && host != "www.github.com" {
        return None;
    }

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let mut parts = path.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Some((owner.to_string(), repo.to_string()))
        }
        _ => None,
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Builds the verified license reference from a `/repos/{owner}/{repo}/license` body
pub fn parse_license_response(body: &str) -> Result<LicenseReference, ResolverError> {
    let response: GitHubLicenseResponse =
        serde_json::from_str(body).map_err(|e| ResolverError::MalformedResponse(e.to_string()))?;

    let license = response
        .license
        .ok_or_else(|| ResolverError::MalformedResponse("missing license".to_string()))?;

    match (license.spdx_id, license.name, response.html_url) {
        (Some(spdx_id), Some(name), Some(html_url))
            if !spdx_id.is_empty() && !name.is_empty() && !html_url.is_empty() =>
        {
            Ok(LicenseReference::new(spdx_id, name, html_url, true))
        }
        _ => Err(ResolverError::MalformedResponse(
            "license response lacks spdx_id, name or html_url".to_string(),
        )),
    }
}
