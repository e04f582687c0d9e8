use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between a failed compliance
/// check and a run that could not be completed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - report generated, or every license is compliant
    Success = 0,
    /// The compliance check found at least one violating license
    ViolationsFound = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (missing lock file, cache failure, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::ViolationsFound => write!(f, "Violations Found (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors surfaced to the user.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// keeping the hint text next to the failure it explains.
#[derive(Debug, Error)]
pub enum LicenseTrackerError {
    #[error("Lock file not found: {path}\n\n💡 Hint: {suggestion}")]
    LockfileNotFound { path: PathBuf, suggestion: String },

    #[error("No scanner available for '{file_name}'\n\n💡 Hint: Supported files: {supported}")]
    UnsupportedLockfile { file_name: String, supported: String },

    #[error("Failed to parse lock file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the lock file is in the correct format")]
    LockfileParseError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("License cache error: {path}\nDetails: {details}\n\n💡 Hint: Run `license-tracker cache clear` or pass --no-cache")]
    CacheError { path: PathBuf, details: String },

    /// Validation error for configuration and builder inputs
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}

/// Reasons a single resolver call produced no metadata.
///
/// These never cross the resolver boundary: each resolver logs the failure
/// at the level matching its kind and returns an absent result instead.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("rate limited by {source_name} after {attempts} attempt(s)")]
    RateLimited {
        source_name: &'static str,
        attempts: u32,
    },

    #[error("{source_name} returned status {status}")]
    UnexpectedStatus {
        source_name: &'static str,
        status: u16,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ResolverError {
    /// Emits this failure for a package at the log level matching its kind.
    pub fn log(&self, resolver: &str, name: &str, version: &str) {
        match self {
            ResolverError::NotFound { .. } | ResolverError::InvalidInput(_) => {
                tracing::debug!(resolver, package = name, version, "{}", self);
            }
            ResolverError::RateLimited { .. } => {
                tracing::warn!(resolver, package = name, version, "{}", self);
            }
            ResolverError::UnexpectedStatus { .. }
            | ResolverError::Network(_)
            | ResolverError::MalformedResponse(_) => {
                tracing::error!(resolver, package = name, version, "{}", self);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::ViolationsFound.as_i32(), 1);
        assert_eq!(ExitCode::InvalidArguments.as_i32(), 2);
        assert_eq!(ExitCode::ApplicationError.as_i32(), 3);
    }

    #[test]
    fn test_exit_code_display() {
        assert_eq!(format!("{}", ExitCode::Success), "Success (0)");
        assert_eq!(
            format!("{}", ExitCode::ViolationsFound),
            "Violations Found (1)"
        );
        assert_eq!(
            format!("{}", ExitCode::ApplicationError),
            "Application Error (3)"
        );
    }

    #[test]
    fn test_lockfile_not_found_display() {
        let error = LicenseTrackerError::LockfileNotFound {
            path: PathBuf::from("/test/path/poetry.lock"),
            suggestion: "Test suggestion".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Lock file not found"));
        assert!(display.contains("/test/path/poetry.lock"));
        assert!(display.contains("💡 Hint:"));
        assert!(display.contains("Test suggestion"));
    }

    #[test]
    fn test_unsupported_lockfile_display() {
        let error = LicenseTrackerError::UnsupportedLockfile {
            file_name: "Cargo.lock".to_string(),
            supported: "poetry.lock, Pipfile.lock, requirements*.txt".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("No scanner available for 'Cargo.lock'"));
        assert!(display.contains("Pipfile.lock"));
    }

    #[test]
    fn test_cache_error_display() {
        let error = LicenseTrackerError::CacheError {
            path: PathBuf::from("/tmp/cache.db"),
            details: "database is locked".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("License cache error"));
        assert!(display.contains("database is locked"));
        assert!(display.contains("--no-cache"));
    }

    #[test]
    fn test_security_error_display() {
        let error = LicenseTrackerError::SecurityError {
            path: PathBuf::from("/test/symlink"),
            reason: "Symbolic links are not allowed".to_string(),
            hint: "Use a regular file instead".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Security violation"));
        assert!(display.contains("/test/symlink"));
        assert!(display.contains("Use a regular file instead"));
    }

    #[test]
    fn test_resolver_error_display() {
        let error = ResolverError::RateLimited {
            source_name: "GitHub",
            attempts: 4,
        };
        assert_eq!(error.to_string(), "rate limited by GitHub after 4 attempt(s)");

        let error = ResolverError::UnexpectedStatus {
            source_name: "PyPI",
            status: 503,
        };
        assert_eq!(error.to_string(), "PyPI returned status 503");
    }
}
