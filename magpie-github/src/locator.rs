//! GitHub URL classification

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Kind of artifact a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Issue,
    PullRequest,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Issue => write!(f, "issue"),
            ArtifactKind::PullRequest => write!(f, "pull_request"),
        }
    }
}

/// Parsed identity of a GitHub issue or pull request URL
///
/// Classification happens here, before any network call: a URL whose path
/// is not `/{owner}/{repo}/issues/{n}` or `/{owner}/{repo}/pull/{n}` is
/// rejected as [`Error::InvalidUrl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocator {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub kind: ArtifactKind,
}

impl ArtifactLocator {
    /// Parse and classify a GitHub issue or pull request URL
    ///
    /// Trailing path segments (e.g. `/files`), query strings, and fragments
    /// (e.g. `#issuecomment-1`) are tolerated and ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = url::Url::parse(raw).map_err(|_| Error::InvalidUrl(raw.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            _ => return Err(Error::InvalidUrl(raw.to_string())),
        }

        match url.host_str() {
            Some("github.com") | Some("www.github.com") => {}
            _ => return Err(Error::InvalidUrl(raw.to_string())),
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        if segments.len() < 4 {
            return Err(Error::InvalidUrl(raw.to_string()));
        }

        let kind = match segments[2] {
            "issues" => ArtifactKind::Issue,
            "pull" => ArtifactKind::PullRequest,
            _ => return Err(Error::InvalidUrl(raw.to_string())),
        };

        let number: u64 = segments[3]
            .parse()
            .map_err(|_| Error::InvalidUrl(raw.to_string()))?;

        Ok(Self {
            owner: segments[0].to_string(),
            repo: segments[1].to_string(),
            number,
            kind,
        })
    }

    /// Canonical URL for this artifact
    pub fn canonical_url(&self) -> String {
        let segment = match self.kind {
            ArtifactKind::Issue => "issues",
            ArtifactKind::PullRequest => "pull",
        };
        format!(
            "https://github.com/{}/{}/{}/{}",
            self.owner, self.repo, segment, self.number
        )
    }

    /// URL of the raw unified diff for a pull request
    ///
    /// `host` comes from configuration; the path template is fixed.
    pub fn diff_url(&self, host: &str) -> String {
        format!(
            "{}/{}/{}/pull/{}.diff",
            host.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.number
        )
    }
}
