use crate::license_resolution::domain::PackageIdentifier;
use crate::ports::outbound::DependencyScanner;
use crate::shared::security::read_text_file;
use crate::shared::Result;
use regex::Regex;
use std::path::Path;

const SOURCE_NAME: &str = "requirements.txt";

/// Name, then an optional comparison operator and version
const PACKAGE_PATTERN: &str =
    r"^([a-zA-Z0-9]([a-zA-Z0-9._-]*[a-zA-Z0-9])?)(?:\s*([><=~!]+)\s*([0-9][0-9a-zA-Z._-]*))?";

const GIT_URL_PATTERN: &str = r"(^git\+|\.git[@#]|^-e\s+git\+)";

/// Reads pinned packages from pip requirements files.
///
/// The version of the first constraint is taken, so `pkg>=1.0,<2.0` yields
/// `1.0`. Lines without a version, options, and git URLs are skipped.
pub struct RequirementsScanner {
    package_pattern: Regex,
    git_url_pattern: Regex,
}

impl RequirementsScanner {
    pub fn new() -> Self {
        Self {
            package_pattern: Regex::new(PACKAGE_PATTERN).expect("Invalid regex pattern"),
            git_url_pattern: Regex::new(GIT_URL_PATTERN).expect("Invalid regex pattern"),
        }
    }

    pub fn parse(&self, content: &str) -> Vec<PackageIdentifier> {
        content
            .lines()
            .enumerate()
            .filter_map(|(index, line)| self.parse_line(index + 1, line))
            .collect()
    }

    fn parse_line(&self, line_number: usize, raw: &str) -> Option<PackageIdentifier> {
        let mut line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        if let Some((before, _)) = line.split_once('#') {
            line = before.trim();
        }

        if self.git_url_pattern.is_match(line) {
            let shown: String = line.chars().take(50).collect();
            tracing::warn!(line = line_number, "Skipping git URL: {}", shown);
            return None;
        }
        if line.starts_with('-') {
            return None;
        }

        let first = line.split(',').next().unwrap_or_default().trim();
        let Some(captures) = self.package_pattern.captures(first) else {
            tracing::debug!(line = line_number, "Could not parse requirement: {}", line);
            return None;
        };

        let name = captures.get(1)?.as_str();
        match captures.get(4) {
            Some(version) => Some(
                PackageIdentifier::new(name, version.as_str().trim()).with_source(SOURCE_NAME),
            ),
            None => {
                tracing::debug!(package = name, "No version specified, skipping");
                None
            }
        }
    }
}

impl Default for RequirementsScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyScanner for RequirementsScanner {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    /// `requirements.txt`, `requirements-dev.txt`, `dev-requirements.txt`, ...
    fn can_handle(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(str::to_lowercase)
            .is_some_and(|name| name.contains("requirements") && name.ends_with(".txt"))
    }

    fn scan(&self, path: &Path) -> Result<Vec<PackageIdentifier>> {
        let content = read_text_file(path, "requirements file")?;
        Ok(self.parse(&content))
    }
}
