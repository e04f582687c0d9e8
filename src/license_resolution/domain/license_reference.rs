use serde::{Deserialize, Serialize};

/// Base URL of the SPDX license list reference pages
const SPDX_LICENSES_URL: &str = "https://spdx.org/licenses";

/// Builds the generic SPDX reference-page URL for a license identifier
pub fn spdx_reference_url(spdx_id: &str) -> String {
    format!("{}/{}.html", SPDX_LICENSES_URL, spdx_id)
}

/// A resolved license with the confidence of its URL.
///
/// Serialized field names (`spdx_id`, `name`, `url`, `is_verified_file`) are
/// the persisted cache format and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LicenseReference {
    spdx_id: String,
    #[serde(rename = "name")]
    display_name: String,
    url: String,
    #[serde(default)]
    is_verified_file: bool,
}

impl LicenseReference {
    pub fn new(
        spdx_id: impl Into<String>,
        display_name: impl Into<String>,
        url: impl Into<String>,
        is_verified_file: bool,
    ) -> Self {
        Self {
            spdx_id: spdx_id.into(),
            display_name: display_name.into(),
            url: url.into(),
            is_verified_file,
        }
    }

    /// Unverified reference pointing at the SPDX page for `spdx_id`
    pub fn spdx_reference(spdx_id: &str, display_name: impl Into<String>) -> Self {
        Self::new(spdx_id, display_name, spdx_reference_url(spdx_id), false)
    }

    pub fn spdx_id(&self) -> &str {
        &self.spdx_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True only when the URL points at a license file inside a source repository
    pub fn is_verified_file(&self) -> bool {
        self.is_verified_file
    }
}
