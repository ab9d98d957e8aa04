//! Artifact data model
//!
//! These types mirror the schema handed to the extraction service: one
//! record per issue or pull request, plus lightweight references to the
//! related items mentioned in it. Timestamps are carried verbatim as the
//! strings the extractor scraped; they are never parsed.

use serde::{Deserialize, Serialize};

use crate::ArtifactKind;

/// Kind of a related-item reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Issue,
    PullRequest,
    Commit,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Issue => write!(f, "issue"),
            ReferenceKind::PullRequest => write!(f, "pull_request"),
            ReferenceKind::Commit => write!(f, "commit"),
        }
    }
}

impl From<ArtifactKind> for ReferenceKind {
    fn from(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Issue => ReferenceKind::Issue,
            ArtifactKind::PullRequest => ReferenceKind::PullRequest,
        }
    }
}

/// Lightweight pointer to a related issue, PR, or commit
///
/// `url` is the only globally comparable identity and is what the
/// traversal engine keys its visited set on. Exactly one of `number`
/// (issues/PRs) or `sha` (commits) is meaningful for a given `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReference {
    /// Kind of the referenced item
    pub kind: ReferenceKind,
    /// Issue or PR number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    /// Commit SHA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Display title, when the source page showed one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Canonical locator of the referenced item
    pub url: String,
}

impl std::fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match (self.number, &self.sha) {
            (Some(number), _) => number.to_string(),
            (None, Some(sha)) => sha.clone(),
            (None, None) => String::new(),
        };
        write!(
            f,
            "{} {}: {} ({})",
            self.kind,
            id,
            self.title.as_deref().unwrap_or(""),
            self.url
        )
    }
}

/// A comment on an issue or pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// GitHub username of the comment author
    pub author: String,
    /// Text content of the comment
    pub content: String,
    /// When the comment was created
    pub created_at: String,
    /// When the comment was last updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A commit included in a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit SHA
    pub sha: String,
    /// Commit message
    pub message: String,
    /// GitHub username of the commit author
    pub author: String,
    /// When the commit was created
    pub created_at: String,
    /// URL to the commit
    pub url: String,
}

/// One file changed by a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path of the file that was changed
    pub filename: String,
    /// Status of the change (added, modified, removed)
    pub status: String,
    /// Number of lines added
    pub additions: u64,
    /// Number of lines deleted
    pub deletions: u64,
    /// Total number of changed lines
    pub changes: u64,
    /// Unified-diff patch for this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

/// Normalized content of a GitHub issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Issue title
    pub title: String,
    /// Issue number
    pub number: u64,
    /// Current state (open, closed)
    pub state: String,
    /// GitHub username of the issue creator
    pub author: String,
    /// When the issue was created
    pub created_at: String,
    /// When the issue was last updated
    pub updated_at: String,
    /// Issue description
    pub body: String,
    /// Comments, in page order
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Labels attached to the issue
    #[serde(default)]
    pub labels: Vec<String>,
    /// Related PRs, issues, and commits mentioned in the issue
    #[serde(default)]
    pub related_items: Vec<ArtifactReference>,
}

/// Normalized content of a GitHub pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    /// PR title
    pub title: String,
    /// PR number
    pub number: u64,
    /// Current state (open, closed, merged)
    pub state: String,
    /// GitHub username of the PR creator
    pub author: String,
    /// When the PR was created
    pub created_at: String,
    /// When the PR was last updated
    pub updated_at: String,
    /// When the PR was merged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<String>,
    /// PR description
    pub body: String,
    /// Comments, in page order
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Commits in the PR, in page order
    #[serde(default)]
    pub commits: Vec<Commit>,
    /// Files changed by the PR
    #[serde(default)]
    pub file_changes: Vec<FileChange>,
    /// Labels attached to the PR
    #[serde(default)]
    pub labels: Vec<String>,
    /// Related PRs, issues, and commits mentioned in the PR
    #[serde(default)]
    pub related_items: Vec<ArtifactReference>,
}

/// A fetched issue or pull request
///
/// Same base field set, kind-specific payload on the PR side; records are
/// created fresh per fetch and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactRecord {
    Issue(IssueRecord),
    PullRequest(PullRequestRecord),
}

impl ArtifactRecord {
    /// Kind of this artifact
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactRecord::Issue(_) => ArtifactKind::Issue,
            ArtifactRecord::PullRequest(_) => ArtifactKind::PullRequest,
        }
    }

    /// Artifact title
    pub fn title(&self) -> &str {
        match self {
            ArtifactRecord::Issue(issue) => &issue.title,
            ArtifactRecord::PullRequest(pr) => &pr.title,
        }
    }

    /// Artifact number
    pub fn number(&self) -> u64 {
        match self {
            ArtifactRecord::Issue(issue) => issue.number,
            ArtifactRecord::PullRequest(pr) => pr.number,
        }
    }

    /// References to the related items mentioned in this artifact
    pub fn related_items(&self) -> &[ArtifactReference] {
        match self {
            ArtifactRecord::Issue(issue) => &issue.related_items,
            ArtifactRecord::PullRequest(pr) => &pr.related_items,
        }
    }
}
