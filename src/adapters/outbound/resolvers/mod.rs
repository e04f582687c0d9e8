/// License data sources used by the waterfall resolver
mod http_session;
mod github_resolver;
mod pypi_resolver;
mod spdx_resolver;

pub use github_resolver::{
    parse_github_url, parse_license_response, retry_rate_limited, Attempt, GitHubResolver,
    DEFAULT_GITHUB_API_URL, MAX_RATE_LIMIT_RETRIES,
};
pub use http_session::{HttpSession, DEFAULT_REQUEST_TIMEOUT};
pub use pypi_resolver::{PyPiResolver, DEFAULT_PYPI_BASE_URL};
pub use spdx_resolver::SpdxResolver;
