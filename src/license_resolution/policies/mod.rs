pub mod compliance_policy;
pub mod spdx_normalizer;

pub use compliance_policy::{ComplianceReport, CompliancePolicy, Violation};
pub use spdx_normalizer::SpdxNormalizer;
