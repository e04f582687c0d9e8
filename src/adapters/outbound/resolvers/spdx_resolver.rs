use crate::license_resolution::domain::{LicenseReference, PackageIdentifier, PackageMetadata};
use crate::ports::outbound::LicenseResolver;
use crate::shared::error::ResolverError;
use async_trait::async_trait;

const SOURCE_NAME: &str = "SPDX";

/// Human-readable names of common SPDX license identifiers
const SPDX_NAMES: &[(&str, &str)] = &[
    ("MIT", "MIT License"),
    ("Apache-2.0", "Apache License 2.0"),
    ("GPL-3.0-only", "GNU General Public License v3.0 only"),
    ("GPL-3.0-or-later", "GNU General Public License v3.0 or later"),
    ("GPL-2.0-only", "GNU General Public License v2.0 only"),
    ("GPL-2.0-or-later", "GNU General Public License v2.0 or later"),
    ("LGPL-3.0-only", "GNU Lesser General Public License v3.0 only"),
    ("LGPL-3.0-or-later", "GNU Lesser General Public License v3.0 or later"),
    ("LGPL-2.1-only", "GNU Lesser General Public License v2.1 only"),
    ("LGPL-2.1-or-later", "GNU Lesser General Public License v2.1 or later"),
    ("LGPL-2.0-only", "GNU Library General Public License v2 only"),
    ("LGPL-2.0-or-later", "GNU Library General Public License v2 or later"),
    ("BSD-3-Clause", "BSD 3-Clause \"New\" or \"Revised\" License"),
    ("BSD-2-Clause", "BSD 2-Clause \"Simplified\" License"),
    ("ISC", "ISC License"),
    ("MPL-2.0", "Mozilla Public License 2.0"),
    ("EPL-2.0", "Eclipse Public License 2.0"),
    ("AGPL-3.0-only", "GNU Affero General Public License v3.0 only"),
    ("AGPL-3.0-or-later", "GNU Affero General Public License v3.0 or later"),
    ("CC0-1.0", "Creative Commons Zero v1.0 Universal"),
    ("Unlicense", "The Unlicense"),
    ("WTFPL", "Do What The F*ck You Want To Public License"),
];

/// SpdxResolver adapter: last-resort reference to the SPDX license page.
///
/// Makes no network calls. It needs an SPDX id from the caller, which is why
/// the automatic waterfall never reaches it and [`LicenseResolver::resolve`]
/// always returns `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpdxResolver;

impl SpdxResolver {
    pub fn new() -> Self {
        Self
    }

    /// Builds metadata carrying one unverified SPDX reference for `spdx_id`.
    ///
    /// Blank ids yield `None`.
    pub fn resolve_with_spdx_id(
        &self,
        id: &PackageIdentifier,
        spdx_id: Option<&str>,
    ) -> Option<PackageMetadata> {
        let spdx_id = match spdx_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(spdx_id) => spdx_id,
            None => {
                ResolverError::InvalidInput("blank SPDX id".to_string()).log(
                    SOURCE_NAME,
                    id.name(),
                    id.version(),
                );
                return None;
            }
        };

        let license = LicenseReference::spdx_reference(spdx_id, display_name(spdx_id));
        Some(PackageMetadata::for_identifier(id).with_licenses(vec![license]))
    }
}

/// Known display name for an SPDX id, or the id itself
pub fn display_name(spdx_id: &str) -> &str {
    SPDX_NAMES
        .iter()
        .find(|(id, _)| *id == spdx_id)
        .map(|(_, name)| *name)
        .unwrap_or(spdx_id)
}

#[async_trait]
impl LicenseResolver for SpdxResolver {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn priority(&self) -> u32 {
        1000
    }

    async fn resolve(&self, _id: &PackageIdentifier) -> Option<PackageMetadata> {
        None
    }
}
