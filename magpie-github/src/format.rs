//! Presentation formatting for LLM consumption
//!
//! Turns an [`ArtifactRecord`] into a flat document: strings and tables
//! instead of nested objects. Pure functions, no I/O; related items come
//! out as reference-only placeholders for the traversal engine to fill.

use serde::Serialize;

use crate::{ArtifactKind, ArtifactRecord, Comment, Commit, FileChange};

/// Flat, LLM-friendly rendering of one artifact
///
/// `related_items` always has the same length and order as the source
/// record's reference list; entries the traversal could not or would not
/// expand keep `content: None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedArtifact {
    pub kind: ArtifactKind,
    pub title: String,
    pub number: u64,
    pub state: String,
    pub author: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<String>,
    pub description: String,
    /// Comments rendered as `**{author}** ({created_at}):\n{content}`
    pub conversation: Vec<String>,
    /// PR commits rendered as `{short_sha}: {message} (by {author} on {created_at})`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commits: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_changes: Option<Vec<FormattedFileChange>>,
    pub labels: Vec<String>,
    pub related_items: Vec<RelatedEntry>,
}

/// One file change in the flat document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedFileChange {
    pub filename: String,
    pub status: String,
    /// Line delta rendered as `+{additions} -{deletions}`
    pub changes: String,
    /// Verbatim patch text, kept for fenced-code rendering downstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

/// A related-item slot in the flat document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedEntry {
    /// Rendered reference line, possibly annotated by the traversal
    pub reference: String,
    /// Nested document for the referenced artifact, when it was expanded
    pub content: Option<FormattedArtifact>,
}

/// Format an artifact record into its flat document shell
pub fn format_artifact(record: &ArtifactRecord) -> FormattedArtifact {
    let related_items = record
        .related_items()
        .iter()
        .map(|reference| RelatedEntry {
            reference: reference.to_string(),
            content: None,
        })
        .collect();

    match record {
        ArtifactRecord::Issue(issue) => FormattedArtifact {
            kind: ArtifactKind::Issue,
            title: issue.title.clone(),
            number: issue.number,
            state: issue.state.clone(),
            author: issue.author.clone(),
            created_at: issue.created_at.clone(),
            merged_at: None,
            description: issue.body.clone(),
            conversation: issue.comments.iter().map(render_comment).collect(),
            commits: None,
            file_changes: None,
            labels: issue.labels.clone(),
            related_items,
        },
        ArtifactRecord::PullRequest(pr) => FormattedArtifact {
            kind: ArtifactKind::PullRequest,
            title: pr.title.clone(),
            number: pr.number,
            state: pr.state.clone(),
            author: pr.author.clone(),
            created_at: pr.created_at.clone(),
            merged_at: pr.merged_at.clone(),
            description: pr.body.clone(),
            conversation: pr.comments.iter().map(render_comment).collect(),
            commits: Some(pr.commits.iter().map(render_commit).collect()),
            file_changes: Some(pr.file_changes.iter().map(render_file_change).collect()),
            labels: pr.labels.clone(),
            related_items,
        },
    }
}

fn render_comment(comment: &Comment) -> String {
    format!(
        "**{}** ({}):\n{}",
        comment.author, comment.created_at, comment.content
    )
}

fn render_commit(commit: &Commit) -> String {
    let short_sha = if commit.sha.len() > 7 {
        &commit.sha[..7]
    } else {
        commit.sha.as_str()
    };
    format!(
        "{}: {} (by {} on {})",
        short_sha, commit.message, commit.author, commit.created_at
    )
}

fn render_file_change(change: &FileChange) -> FormattedFileChange {
    FormattedFileChange {
        filename: change.filename.clone(),
        status: change.status.clone(),
        changes: format!("+{} -{}", change.additions, change.deletions),
        patch: change.patch.clone(),
    }
}
