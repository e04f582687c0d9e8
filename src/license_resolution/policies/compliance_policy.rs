use crate::license_resolution::domain::{PackageIdentifier, PackageMetadata};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// License compliance rule applied to resolved packages.
///
/// Identifiers are compared exactly as stored on the license references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompliancePolicy {
    /// Deny list: a license in the set is a violation
    Forbidden(BTreeSet<String>),
    /// Allow list: a license outside the set is a violation
    Allowed(BTreeSet<String>),
}

/// A package license that breaks the policy
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Violation {
    pub package: String,
    pub version: String,
    pub license: String,
}

/// Result of applying a [`CompliancePolicy`] to a set of resolved packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceReport {
    pub violations: Vec<Violation>,
    /// Names of packages with no metadata or no license, sorted
    pub unknown: Vec<String>,
    pub checked: usize,
}

impl ComplianceReport {
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }
}

impl CompliancePolicy {
    pub fn forbidden<I, S>(licenses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Forbidden(licenses.into_iter().map(Into::into).collect())
    }

    pub fn allowed<I, S>(licenses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Allowed(licenses.into_iter().map(Into::into).collect())
    }

    /// Splits a comma-separated license list, dropping blank entries
    pub fn parse_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn is_violation(&self, spdx_id: &str) -> bool {
        match self {
            CompliancePolicy::Forbidden(set) => set.contains(spdx_id),
            CompliancePolicy::Allowed(set) => !set.contains(spdx_id),
        }
    }

    /// Checks every license of every package.
    ///
    /// Packages missing from `resolved`, resolved to nothing, or resolved
    /// without licenses are listed as unknown instead of being judged.
    pub fn evaluate(
        &self,
        packages: &[PackageIdentifier],
        resolved: &HashMap<PackageIdentifier, Option<Arc<PackageMetadata>>>,
    ) -> ComplianceReport {
        let mut violations = BTreeSet::new();
        let mut unknown = BTreeSet::new();

        for id in packages {
            match resolved.get(id).and_then(|m| m.as_ref()) {
                Some(metadata) if metadata.has_licenses() => {
                    for license in metadata.licenses() {
                        if self.is_violation(license.spdx_id()) {
                            violations.insert(Violation {
                                package: id.name().to_string(),
                                version: id.version().to_string(),
                                license: license.spdx_id().to_string(),
                            });
                        }
                    }
                }
                _ => {
                    unknown.insert(id.name().to_string());
                }
            }
        }

        ComplianceReport {
            violations: violations.into_iter().collect(),
            unknown: unknown.into_iter().collect(),
            checked: packages.len(),
        }
    }
}
