use std::fmt;

/// Immutable identity of a dependency as produced by a scanner.
///
/// Equality and hashing cover all three fields, so the same package reported
/// by two different scanners stays two distinct identifiers. Code that must
/// treat those as one (cache lookups, batch deduplication) goes through
/// [`PackageIdentifier::key`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageIdentifier {
    name: String,
    version: String,
    source: Option<String>,
}

impl PackageIdentifier {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source: None,
        }
    }

    /// Tags the identifier with the scanner that produced it
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Provenance-insensitive key used for caching and deduplication
    pub fn key(&self) -> PackageKey {
        PackageKey::new(&self.name, &self.version)
    }
}

impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

/// (name, version) pair: the primary key of the license cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageKey {
    pub name: String,
    pub version: String,
}

impl PackageKey {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identifier_accessors() {
        let id = PackageIdentifier::new("requests", "2.31.0").with_source("poetry.lock");
        assert_eq!(id.name(), "requests");
        assert_eq!(id.version(), "2.31.0");
        assert_eq!(id.source(), Some("poetry.lock"));
        assert_eq!(id.to_string(), "requests==2.31.0");
    }

    #[test]
    fn test_identifier_equality_includes_source() {
        let a = PackageIdentifier::new("requests", "2.31.0").with_source("poetry.lock");
        let b = PackageIdentifier::new("requests", "2.31.0").with_source("Pipfile.lock");
        let c = PackageIdentifier::new("requests", "2.31.0").with_source("poetry.lock");

        assert_ne!(a, b);
        assert_eq!(a, c);

        let set: HashSet<_> = [a.clone(), b.clone(), c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_key_ignores_source() {
        let a = PackageIdentifier::new("requests", "2.31.0").with_source("poetry.lock");
        let b = PackageIdentifier::new("requests", "2.31.0");
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), PackageIdentifier::new("requests", "2.32.0").key());
    }
}
