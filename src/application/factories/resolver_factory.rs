use crate::adapters::outbound::resolvers::{
    GitHubResolver, PyPiResolver, SpdxResolver, DEFAULT_REQUEST_TIMEOUT,
};
use crate::application::services::{WaterfallResolver, DEFAULT_MAX_CONCURRENCY};
use std::time::Duration;

/// The production waterfall: PyPI, then GitHub, with the SPDX fallback owned
pub type DefaultWaterfall = WaterfallResolver<PyPiResolver, GitHubResolver, SpdxResolver>;

/// Settings for building the production waterfall
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub github_token: Option<String>,
    pub request_timeout: Duration,
    pub max_concurrency: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            github_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Factory for creating the license resolver chain
///
/// Resolvers are created without opening any connection; sessions are
/// established on first use and released when the waterfall is closed.
pub struct ResolverFactory;

impl ResolverFactory {
    pub fn create(options: ResolverOptions) -> DefaultWaterfall {
        let token = options.github_token.filter(|t| !t.trim().is_empty());
        if token.is_none() {
            tracing::debug!("No GitHub token configured, using unauthenticated rate limits");
        }

        WaterfallResolver::new(
            PyPiResolver::with_timeout(options.request_timeout),
            GitHubResolver::with_timeout(token, options.request_timeout),
            SpdxResolver::new(),
        )
        .with_max_concurrency(options.max_concurrency)
    }
}
