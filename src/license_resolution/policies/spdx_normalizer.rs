use crate::license_resolution::domain::LicenseReference;
use dashmap::DashMap;

/// Default upper bound on memoized normalization results
pub const DEFAULT_MEMO_CAPACITY: usize = 1024;

/// Exact aliases for license strings commonly found in package metadata
const LICENSE_ALIASES: &[(&str, &str)] = &[
    ("Apache 2.0", "Apache-2.0"),
    ("Apache License 2.0", "Apache-2.0"),
    ("Apache Software License", "Apache-2.0"),
    ("Apache License, Version 2.0", "Apache-2.0"),
    ("MIT License", "MIT"),
    ("BSD License", "BSD-3-Clause"),
    ("BSD 3-Clause License", "BSD-3-Clause"),
    ("BSD 2-Clause License", "BSD-2-Clause"),
    ("GNU General Public License v3", "GPL-3.0"),
    ("GNU General Public License v3 (GPLv3)", "GPL-3.0"),
    ("GNU General Public License v2", "GPL-2.0"),
    ("GNU Lesser General Public License v3", "LGPL-3.0"),
    ("Mozilla Public License 2.0", "MPL-2.0"),
    ("ISC License", "ISC"),
    ("Python Software Foundation License", "PSF-2.0"),
];

/// Identifiers tried, in order, by the loose substring match.
/// Order matters: the first hit wins, so ids that contain another id
/// (`LGPL-3.0` contains `GPL-3.0`) come first.
const COMMON_SPDX_IDS: &[&str] = &[
    "MIT",
    "Apache-2.0",
    "AGPL-3.0",
    "LGPL-3.0",
    "LGPL-2.1",
    "LGPL-2.0",
    "GPL-3.0",
    "GPL-2.0",
    "BSD-3-Clause",
    "BSD-2-Clause",
    "ISC",
    "MPL-2.0",
    "PSF-2.0",
];

/// Normalizes raw license strings from package metadata to SPDX identifiers.
///
/// Strategy, first match wins:
/// 1. exact alias table lookup
/// 2. lookup in the SPDX license list, or validation as an SPDX expression
/// 3. case and punctuation insensitive substring match against common ids
///
/// Results are memoized per raw string for the life of the normalizer, up to
/// a fixed number of entries.
pub struct SpdxNormalizer {
    memo: DashMap<String, Option<LicenseReference>>,
    capacity: usize,
}

impl SpdxNormalizer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMO_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            memo: DashMap::new(),
            capacity,
        }
    }

    /// Normalizes one raw license string.
    ///
    /// Returns an unverified SPDX reference whose display name is the raw
    /// (trimmed) string, or None if the string is blank, `UNKNOWN`, or not
    /// recognized.
    pub fn normalize(&self, raw: &str) -> Option<LicenseReference> {
        let text = raw.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("UNKNOWN") {
            return None;
        }

        if let Some(hit) = self.memo.get(text) {
            return hit.value().clone();
        }

        let result = Self::spdx_id_for(text).map(|id| LicenseReference::spdx_reference(&id, text));
        if result.is_none() {
            tracing::debug!(license = text, "Could not normalize license");
        }

        if self.memo.len() < self.capacity {
            self.memo.insert(text.to_string(), result.clone());
        }
        result
    }

    /// Selects the license of a package from its metadata fields.
    ///
    /// Priority order:
    /// 1. `license` field (if present, not blank and not "UNKNOWN") when it normalizes
    /// 2. `license_expression` field under the same rule
    /// 3. the first `License :: ...` classifier whose last segment normalizes
    ///
    /// At most one license is returned.
    pub fn select_licenses(
        &self,
        license: Option<&str>,
        license_expression: Option<&str>,
        classifiers: &[String],
    ) -> Vec<LicenseReference> {
        license
            .and_then(|l| self.normalize(l))
            .or_else(|| license_expression.and_then(|l| self.normalize(l)))
            .or_else(|| {
                classifiers
                    .iter()
                    .filter_map(|c| license_from_classifier(c))
                    .find_map(|name| self.normalize(name))
            })
            .into_iter()
            .collect()
    }

    /// Number of memoized raw strings
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    fn spdx_id_for(text: &str) -> Option<String> {
        if let Some((_, id)) = LICENSE_ALIASES.iter().find(|(alias, _)| *alias == text) {
            return Some((*id).to_string());
        }

        if let Some(expression) = canonical_expression(text) {
            return Some(expression);
        }

        let upper = text.to_uppercase();
        let squashed = upper.replace(['-', ' '], "");
        COMMON_SPDX_IDS
            .iter()
            .find(|id| {
                let id_upper = id.to_uppercase();
                upper.contains(&id_upper) || squashed.contains(&id_upper.replace('-', ""))
            })
            .map(|id| (*id).to_string())
    }
}

impl Default for SpdxNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the license name from a `License :: ... :: Name` classifier
fn license_from_classifier(classifier: &str) -> Option<&str> {
    if !classifier.starts_with("License :: ") {
        return None;
    }
    let parts: Vec<&str> = classifier.split(" :: ").collect();
    if parts.len() < 2 {
        return None;
    }
    parts.last().map(|s| s.trim())
}

/// Canonical SPDX form of `text`, or None if it is not a valid expression.
///
/// A single identifier is matched case-insensitively against the SPDX
/// license list, or by its full license name. Anything else must parse as
/// an SPDX expression once lower-case operators and `+` suffixes are fixed up.
fn canonical_expression(text: &str) -> Option<String> {
    if let Some((id, _, _)) = spdx::identifiers::LICENSES
        .iter()
        .find(|(id, full, _)| id.eq_ignore_ascii_case(text) || *full == text)
    {
        return Some((*id).to_string());
    }

    let canonical = match spdx::Expression::canonicalize(text) {
        Ok(Some(fixed)) => fixed,
        Ok(None) => text.to_string(),
        Err(_) => return None,
    };
    spdx::Expression::parse(&canonical).ok().map(|_| canonical)
}
