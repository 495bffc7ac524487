//! The resolved version record and descriptor parsing.
//!
//! A descriptor is the raw text printed by `git describe --tags --long`,
//! e.g. `v1.0-2-gfeeb`: the nearest tag, the number of commits since that
//! tag and the abbreviated commit id, joined by `-`. Tags may themselves
//! contain `-`, so the descriptor is split from the right.

use std::fmt;

use serde::Serialize;

/// A resolved version.
///
/// Field order is fixed: `version`, `commits`, `sha`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Version {
    /// Normalized display version, e.g. `1.0` or `1.0.dev2`.
    pub version: String,
    /// Commits since the nearest tag, as a decimal string.
    pub commits: String,
    /// Abbreviated commit identifier.
    pub sha: String,
}

impl Version {
    pub fn new(
        version: impl Into<String>,
        commits: impl Into<String>,
        sha: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            commits: commits.into(),
            sha: sha.into(),
        }
    }

    /// Whether this build is past the last tagged release.
    pub fn is_dev(&self) -> bool {
        self.commits != "0"
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

/// The three fields of a descriptor, borrowed from the raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor<'a> {
    /// Tag with a single leading `v` removed.
    pub tag: &'a str,
    pub commits: &'a str,
    pub sha: &'a str,
}

impl<'a> Descriptor<'a> {
    /// Split `raw` from the right into exactly three `-`-separated fields.
    ///
    /// Returns `None` when the string holds fewer than two separators.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let mut fields = raw.rsplitn(3, '-');
        let sha = fields.next()?;
        let commits = fields.next()?;
        let tag = fields.next()?;
        Some(Self {
            tag: tag.strip_prefix('v').unwrap_or(tag),
            commits,
            sha,
        })
    }

    /// Build the display version.
    ///
    /// The tag alone is used for tagged commits or when dev versions are
    /// disabled; otherwise `<tag>.dev<commits>`.
    pub fn into_version(self, include_dev_version: bool) -> Version {
        let version = if self.commits == "0" || !include_dev_version {
            self.tag.to_string()
        } else {
            format!("{}.dev{}", self.tag, self.commits)
        };
        Version::new(version, self.commits, self.sha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor() {
        let d = Descriptor::parse("1.0-2-gfeeb").unwrap();
        assert_eq!(d.tag, "1.0");
        assert_eq!(d.commits, "2");
        assert_eq!(d.sha, "gfeeb");
    }

    #[test]
    fn test_parse_strips_leading_v_from_tag_only() {
        let d = Descriptor::parse("v1.0-0-gbeef").unwrap();
        assert_eq!(d.tag, "1.0");

        // Only one `v` goes, and never from the other fields.
        let d = Descriptor::parse("vv2-3-vabc").unwrap();
        assert_eq!(d.tag, "v2");
        assert_eq!(d.sha, "vabc");
    }

    #[test]
    fn test_parse_tag_with_dashes() {
        let d = Descriptor::parse("1.0-rc-1-5-gabc123").unwrap();
        assert_eq!(d.tag, "1.0-rc-1");
        assert_eq!(d.commits, "5");
        assert_eq!(d.sha, "gabc123");
    }

    #[test]
    fn test_parse_rejects_too_few_fields() {
        assert_eq!(Descriptor::parse("foob"), None);
        assert_eq!(Descriptor::parse("1.0-gbeef"), None);
        assert_eq!(Descriptor::parse(""), None);
    }

    #[test]
    fn test_tagged_commit_ignores_dev_flag() {
        let d = Descriptor::parse("1.0-0-gbeef").unwrap();
        assert_eq!(d.into_version(true), Version::new("1.0", "0", "gbeef"));
        assert_eq!(d.into_version(false), Version::new("1.0", "0", "gbeef"));
    }

    #[test]
    fn test_dev_version() {
        let d = Descriptor::parse("1.0-2-gfeeb").unwrap();
        assert_eq!(d.into_version(true), Version::new("1.0.dev2", "2", "gfeeb"));
        assert_eq!(d.into_version(false), Version::new("1.0", "2", "gfeeb"));
    }

    #[test]
    fn test_version_display_and_fields() {
        let v = Version::new("1.0.dev2", "2", "gfeeb");
        assert_eq!(v.to_string(), "1.0.dev2");
        assert!(v.is_dev());
        assert!(!Version::new("1.0", "0", "gbeef").is_dev());
    }
}
