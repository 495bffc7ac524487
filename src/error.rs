//! Resolution failures and their diagnostic rendering.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status used by entry points when a version cannot be resolved.
pub const RESOLUTION_FAILURE_EXIT_CODE: u8 = 2;

/// Where a raw descriptor string came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// Standard output of the version-control command.
    Vcs,
    /// The cached version file at this path.
    VersionFile(PathBuf),
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vcs => f.write_str("VCS"),
            Self::VersionFile(path) => write!(f, "{:?}", path),
        }
    }
}

/// Discriminant of [`ResolveError`], for callers that only need the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    VcsUnavailableNoFallback,
    VcsUnavailableNoCache,
    UnparsableVersion,
    InvalidConfig,
    Io,
}

/// Errors returned while resolving a version.
///
/// `vcs_output` holds whatever the command wrote to stderr, and is only
/// populated when the command itself failed to produce a descriptor.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{args:?} failed.")]
    VcsUnavailableNoFallback {
        args: Vec<String>,
        vcs_output: Option<String>,
    },

    #[error("{args:?} failed and {version_file:?} isn't present.")]
    VcsUnavailableNoCache {
        args: Vec<String>,
        version_file: PathBuf,
        vcs_output: Option<String>,
    },

    #[error("{raw:?} (from {origin}) couldn't be parsed into a version.")]
    UnparsableVersion {
        raw: String,
        origin: VersionSource,
        vcs_output: Option<String>,
    },

    #[error("invalid vcversioner configuration: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VcsUnavailableNoFallback { .. } => ErrorKind::VcsUnavailableNoFallback,
            Self::VcsUnavailableNoCache { .. } => ErrorKind::VcsUnavailableNoCache,
            Self::UnparsableVersion { .. } => ErrorKind::UnparsableVersion,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Process exit status for an entry point reporting this error.
    ///
    /// Configuration and filesystem errors are not resolution failures and
    /// exit with the generic status 1.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::VcsUnavailableNoFallback
            | ErrorKind::VcsUnavailableNoCache
            | ErrorKind::UnparsableVersion => RESOLUTION_FAILURE_EXIT_CODE,
            ErrorKind::InvalidConfig | ErrorKind::Io => 1,
        }
    }

    fn vcs_output(&self) -> Option<&str> {
        match self {
            Self::VcsUnavailableNoFallback { vcs_output, .. }
            | Self::VcsUnavailableNoCache { vcs_output, .. }
            | Self::UnparsableVersion { vcs_output, .. } => vcs_output.as_deref(),
            Self::InvalidConfig(_) | Self::Io { .. } => None,
        }
    }

    /// Human-readable diagnostic lines, without the `vcversioner:` prefix.
    pub fn diagnostic_lines(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        if let Self::VcsUnavailableNoCache { .. } = self {
            lines.push("are you installing from a github tarball?".to_string());
        }
        if let Some(output) = self.vcs_output() {
            lines.push("-- VCS output follows --".to_string());
            lines.extend(output.lines().map(str::to_string));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fallback_lines_include_command() {
        let err = ResolveError::VcsUnavailableNoFallback {
            args: vec!["git".to_string(), "describe".to_string()],
            vcs_output: None,
        };
        assert_eq!(err.diagnostic_lines(), vec![r#"["git", "describe"] failed."#]);
        assert_eq!(err.kind(), ErrorKind::VcsUnavailableNoFallback);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_no_cache_lines_include_hint_and_vcs_output() {
        let err = ResolveError::VcsUnavailableNoCache {
            args: vec![],
            version_file: PathBuf::from("version.txt"),
            vcs_output: Some("fatal: whatever".to_string()),
        };
        assert_eq!(
            err.diagnostic_lines(),
            vec![
                r#"[] failed and "version.txt" isn't present."#,
                "are you installing from a github tarball?",
                "-- VCS output follows --",
                "fatal: whatever",
            ]
        );
    }

    #[test]
    fn test_unparsable_names_source() {
        let err = ResolveError::UnparsableVersion {
            raw: "foob".to_string(),
            origin: VersionSource::Vcs,
            vcs_output: None,
        };
        assert_eq!(
            err.diagnostic_lines(),
            vec![r#""foob" (from VCS) couldn't be parsed into a version."#]
        );

        let err = ResolveError::UnparsableVersion {
            raw: "doof".to_string(),
            origin: VersionSource::VersionFile(PathBuf::from("version.txt")),
            vcs_output: Some("fatal: one\nfatal: two".to_string()),
        };
        assert_eq!(
            err.diagnostic_lines(),
            vec![
                r#""doof" (from "version.txt") couldn't be parsed into a version."#,
                "-- VCS output follows --",
                "fatal: one",
                "fatal: two",
            ]
        );
    }

    #[test]
    fn test_io_error_is_not_a_resolution_failure() {
        let err = ResolveError::io(
            "spam/eggs",
            io::Error::new(io::ErrorKind::PermissionDenied, "hi!"),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("spam/eggs"));
    }
}
