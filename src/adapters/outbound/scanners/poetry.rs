use crate::license_resolution::domain::PackageIdentifier;
use crate::ports::outbound::DependencyScanner;
use crate::shared::error::LicenseTrackerError;
use crate::shared::security::read_text_file;
use crate::shared::Result;
use serde::Deserialize;
use std::path::Path;

const SOURCE_NAME: &str = "poetry.lock";

#[derive(Debug, Deserialize)]
struct PoetryLock {
    #[serde(default)]
    package: Vec<PoetryPackage>,
}

#[derive(Debug, Deserialize)]
struct PoetryPackage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Reads `[[package]]` entries from a `poetry.lock` file
#[derive(Debug, Default, Clone, Copy)]
pub struct PoetryScanner;

impl PoetryScanner {
    pub fn new() -> Self {
        Self
    }

    /// Parses lock file content; every package needs a name and a version
    pub fn parse(&self, content: &str, path: &Path) -> Result<Vec<PackageIdentifier>> {
        let parse_error = |details: String| LicenseTrackerError::LockfileParseError {
            path: path.to_path_buf(),
            details,
        };

        let lock: PoetryLock =
            toml::from_str(content).map_err(|e| parse_error(format!("Invalid TOML: {}", e)))?;

        lock.package
            .into_iter()
            .enumerate()
            .map(|(index, pkg)| -> Result<PackageIdentifier> {
                let name = pkg.name.ok_or_else(|| {
                    parse_error(format!("package #{} is missing required field 'name'", index + 1))
                })?;
                let version = pkg.version.ok_or_else(|| {
                    parse_error(format!(
                        "package '{}' is missing required field 'version'",
                        name
                    ))
                })?;
                Ok(PackageIdentifier::new(name, version).with_source(SOURCE_NAME))
            })
            .collect()
    }
}

impl DependencyScanner for PoetryScanner {
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
    use std::fs;
    use tempfile::TempDir;

    const LOCK: &str = r#"
[[package]]
name = "requests"
version = "2.31.0"
description = "Python HTTP for Humans."
optional = false
python-versions = ">=3.7"

[[package]]
name = "urllib3"
version = "2.0.7"

[metadata]
lock-version = "2.0"
"#;

    #[test]
    fn test_scan_poetry_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poetry.lock");
        fs::write(&path, LOCK).unwrap();

        let packages = PoetryScanner::new().scan(&path).unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name(), "requests");
        assert_eq!(packages[0].version(), "2.31.0");
        assert_eq!(packages[0].source(), Some("poetry.lock"));
        assert_eq!(packages[1].name(), "urllib3");
    }

    #[test]
    fn test_empty_lock_file() {
        let packages = PoetryScanner::new()
            .parse("[metadata]\nlock-version = \"2.0\"\n", Path::new("poetry.lock"))
            .unwrap();
        assert!(packages.is_empty());
    }

    #[test]
    fn test_missing_version_is_an_error() {
        let err = PoetryScanner::new()
            .parse("[[package]]\nname = \"requests\"\n", Path::new("poetry.lock"))
            .unwrap_err();
        assert!(err.to_string().contains("missing required field 'version'"));
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let err = PoetryScanner::new()
            .parse("[[package]]\nversion = \"1.0\"\n", Path::new("poetry.lock"))
            .unwrap_err();
        assert!(err.to_string().contains("missing required field 'name'"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = PoetryScanner::new()
            .parse("[[package]\nname = ", Path::new("poetry.lock"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse lock file"));
    }

    #[test]
    fn test_can_handle() {
        let scanner = PoetryScanner::new();
        assert!(scanner.can_handle(Path::new("/project/poetry.lock")));
        assert!(!scanner.can_handle(Path::new("/project/Poetry.lock")));
        assert!(!scanner.can_handle(Path::new("/project/Pipfile.lock")));
    }
}
