use crate::license_resolution::domain::PackageIdentifier;
use crate::ports::outbound::DependencyScanner;
use crate::shared::error::LicenseTrackerError;
use crate::shared::security::read_text_file;
use crate::shared::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const SOURCE_NAME: &str = "Pipfile.lock";

#[derive(Debug, Deserialize)]
struct PipfileLock {
    #[serde(default)]
    default: BTreeMap<String, PipfileEntry>,
    #[serde(default)]
    develop: BTreeMap<String, PipfileEntry>,
}

#[derive(Debug, Deserialize)]
struct PipfileEntry {
    #[serde(default)]
    version: Option<String>,
}

/// Reads the `default` and `develop` sections of a `Pipfile.lock`
#[derive(Debug, Default, Clone, Copy)]
pub struct PipenvScanner;

impl PipenvScanner {
    pub fn new() -> Self {
        Self
    }

    /// Parses lock file content; entries without a pinned version are skipped
    pub fn parse(&self, content: &str, path: &Path) -> Result<Vec<PackageIdentifier>> {
        let lock: PipfileLock =
            serde_json::from_str(content).map_err(|e| LicenseTrackerError::LockfileParseError {
                path: path.to_path_buf(),
                details: format!("Invalid JSON: {}", e),
            })?;

        Ok(lock
            .default
            .into_iter()
            .chain(lock.develop)
            .filter_map(|(name, entry)| {
                let version = normalize_version(entry.version.as_deref()?);
                if version.is_empty() {
                    tracing::debug!(package = %name, "Skipping Pipfile.lock entry without a version");
                    return None;
                }
                Some(PackageIdentifier::new(name, version).with_source(SOURCE_NAME))
            })
            .collect())
    }
}

/// `"==2.31.0"` -> `"2.31.0"`
fn normalize_version(version: &str) -> String {
    version.trim_start_matches('=').trim().to_string()
}

impl DependencyScanner for PipenvScanner {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn can_handle(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| name == SOURCE_NAME)
    }

    fn scan(&self, path: &Path) -> Result<Vec<PackageIdentifier>> {
        let content = read_text_file(path, SOURCE_NAME)?;
        self.parse(&content, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = r#"{
        "_meta": {"hash": {"sha256": "abc"}},
        "default": {
            "requests": {"hashes": [], "version": "==2.31.0"},
            "mylib": {"git": "https://github.com/me/mylib.git", "ref": "abc123"}
        },
        "develop": {
            "pytest": {"version": "==8.0.0"}
        }
    }"#;

    #[test]
    fn test_parse_default_and_develop() {
        let mut packages = PipenvScanner::new()
            .parse(LOCK, Path::new("Pipfile.lock"))
            .unwrap();
        packages.sort();

        let pairs: Vec<_> = packages.iter().map(|p| (p.name(), p.version())).collect();
        assert_eq!(pairs, vec![("pytest", "8.0.0"), ("requests", "2.31.0")]);
        assert!(packages.iter().all(|p| p.source() == Some("Pipfile.lock")));
    }

    #[test]
    fn test_missing_sections() {
        let packages = PipenvScanner::new()
            .parse(r#"{"_meta": {}}"#, Path::new("Pipfile.lock"))
            .unwrap();
        assert!(packages.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let err = PipenvScanner::new()
            .parse("{not json", Path::new("Pipfile.lock"))
            .unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("==2.31.0"), "2.31.0");
        assert_eq!(normalize_version("== 1.0 "), "1.0");
        assert_eq!(normalize_version("=="), "");
    }

    #[test]
    fn test_can_handle() {
        let scanner = PipenvScanner::new();
        assert!(scanner.can_handle(Path::new("Pipfile.lock")));
        assert!(!scanner.can_handle(Path::new("Pipfile")));
    }
}
