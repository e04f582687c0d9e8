use async_trait::async_trait;
use license_tracker::adapters::outbound::resolvers::{parse_github_url, parse_license_response};
use license_tracker::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock source-host enricher serving canned GitHub license bodies per `owner/repo`
#[derive(Clone, Default)]
pub struct MockEnricher {
    bodies: HashMap<String, String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub closes: Arc<AtomicUsize>,
}

impl MockEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves a verified license file for `owner/repo`
    pub fn with_license_file(mut self, repo: &str, spdx_id: &str, name: &str) -> Self {
        let body = format!(
            r#"{{"html_url": "https://github.com/{repo}/blob/main/LICENSE", "license": {{"spdx_id": "{spdx_id}", "name": "{name}"}}}}"#
        );
        self.bodies.insert(repo.to_string(), body);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LicenseResolver for MockEnricher {
    fn name(&self) -> &'static str {
        "MockHost"
    }

    fn priority(&self) -> u32 {
        80
    }

    async fn resolve(&self, _id: &PackageIdentifier) -> Option<PackageMetadata> {
        None
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LicenseEnricher for MockEnricher {
    async fn enrich(
        &self,
        id: &PackageIdentifier,
        base: &PackageMetadata,
    ) -> Option<PackageMetadata> {
        self.calls.lock().unwrap().push(id.name().to_string());
        let (owner, repo) = parse_github_url(base.repository_url()?)?;
        let body = self.bodies.get(&format!("{}/{}", owner, repo))?;
        let license = parse_license_response(body).ok()?;
        Some(base.replace_licenses(vec![license]))
    }
}
