use async_trait::async_trait;
use license_tracker::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock index resolver serving canned PyPI JSON bodies
///
/// Bodies go through the real PyPI parser, so the mock only replaces the
/// HTTP round trip. Unknown packages behave like a 404.
#[derive(Clone, Default)]
pub struct MockIndexResolver {
    bodies: HashMap<String, String>,
    panics_on: Option<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub closes: Arc<AtomicUsize>,
}

impl MockIndexResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, name: &str, body: &str) -> Self {
        self.bodies.insert(name.to_string(), body.to_string());
        self
    }

    /// Registers a package whose index entry only carries a license string
    pub fn with_license(self, name: &str, license: &str) -> Self {
        let body = format!(
            r#"{{"info": {{"name": "{}", "license": "{}", "classifiers": [], "project_urls": null}}}}"#,
            name, license
        );
        self.with_body(name, &body)
    }

    pub fn panicking_on(mut self, name: &str) -> Self {
        self.panics_on = Some(name.to_string());
        self
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|n| *n == name).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LicenseResolver for MockIndexResolver {
    fn name(&self) -> &'static str {
        "MockIndex"
    }

    fn priority(&self) -> u32 {
        10
    }

    async fn resolve(&self, id: &PackageIdentifier) -> Option<PackageMetadata> {
        self.calls.lock().unwrap().push(id.name().to_string());
        tokio::task::yield_now().await;

        if self.panics_on.as_deref() == Some(id.name()) {
            panic!("simulated defect while resolving {}", id);
        }

        let body = self.bodies.get(id.name())?;
        PyPiResolver::new().parse_response(body, id).ok()
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
