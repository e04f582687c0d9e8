use crate::application::dto::ResolutionResponse;
use crate::license_resolution::policies::{CompliancePolicy, ComplianceReport};
use crate::ports::outbound::ProgressReporter;

/// CheckComplianceUseCase - applies a license policy to resolved packages
///
/// Packages without license data are reported as unknown, never as
/// violations.
pub struct CheckComplianceUseCase<PR> {
    policy: CompliancePolicy,
    progress_reporter: PR,
}

impl<PR: ProgressReporter> CheckComplianceUseCase<PR> {
    pub fn new(policy: CompliancePolicy, progress_reporter: PR) -> Self {
        Self {
            policy,
            progress_reporter,
        }
    }

    pub fn execute(&self, response: &ResolutionResponse) -> ComplianceReport {
        self.progress_reporter.report("⚖️  Checking license compliance...");
        let report = self.policy.evaluate(&response.packages, &response.resolved);

        tracing::info!(
            checked = report.checked,
            violations = report.violations.len(),
            unknown = report.unknown.len(),
            "Compliance check complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license_resolution::domain::{LicenseReference, PackageIdentifier, PackageMetadata};
    use crate::ports::outbound::BatchResolution;
    use std::sync::Arc;

    struct SilentReporter;

    impl ProgressReporter for SilentReporter {
        fn report(&self, _message: &str) {}
        fn report_progress(&self, _current: usize, _total: usize, _message: Option<&str>) {}
        fn report_error(&self, _message: &str) {}
        fn report_completion(&self, _message: &str) {}
    }

    fn response() -> ResolutionResponse {
        let gpl = PackageIdentifier::new("gplpkg", "1.0");
        let mit = PackageIdentifier::new("mitpkg", "2.0");
        let lost = PackageIdentifier::new("lost", "0.1");

        let mut resolved = BatchResolution::new();
        resolved.insert(
            gpl.clone(),
            Some(Arc::new(PackageMetadata::for_identifier(&gpl).with_licenses(vec![
                LicenseReference::spdx_reference("GPL-3.0", "GPL v3"),
            ]))),
        );
        resolved.insert(
            mit.clone(),
            Some(Arc::new(PackageMetadata::for_identifier(&mit).with_licenses(vec![
                LicenseReference::spdx_reference("MIT", "MIT"),
            ]))),
        );
        resolved.insert(lost.clone(), None);

        ResolutionResponse::new(vec![gpl, mit, lost], resolved, 0)
    }

    #[test]
    fn test_forbidden_violation() {
        let use_case =
            CheckComplianceUseCase::new(CompliancePolicy::forbidden(["GPL-3.0"]), SilentReporter);
        let report = use_case.execute(&response());
        assert_eq!(report.checked, 3);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].package, "gplpkg");
        assert_eq!(report.unknown, vec!["lost"]);
    }

    #[test]
    fn test_allowed_list_compliant() {
        let use_case = CheckComplianceUseCase::new(
            CompliancePolicy::allowed(["GPL-3.0", "MIT"]),
            SilentReporter,
        );
        let report = use_case.execute(&response());
        assert!(report.is_compliant());
        assert_eq!(report.unknown.len(), 1);
    }
}
