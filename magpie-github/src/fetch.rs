//! Single-artifact fetching
//!
//! Classifies the URL, asks the extraction service for a record matching
//! the per-kind schema, and (for pull requests) attaches patch text from
//! the raw diff.

use serde_json::json;
use tracing::info;

use crate::diff::{backfill_patches, split_unified_diff};
use crate::{
    ArtifactKind, ArtifactLocator, ArtifactRecord, Error, ExtractorClient, IssueRecord,
    PullRequestRecord, Result,
};

const ISSUE_PROMPT: &str = "Extract GitHub issue information based on the schema provided.";
const PULL_REQUEST_PROMPT: &str = "Extract GitHub pull request information including comments, \
     commits, and file changes based on the schema provided.";

impl ExtractorClient {
    /// Fetch the issue or pull request at `url`
    ///
    /// Fails with [`Error::InvalidUrl`] before any network call when the
    /// URL is not a recognized issue/PR URL.
    pub async fn fetch_artifact(&self, url: &str) -> Result<ArtifactRecord> {
        let locator = ArtifactLocator::parse(url)?;

        match locator.kind {
            ArtifactKind::Issue => self.fetch_issue(url).await.map(ArtifactRecord::Issue),
            ArtifactKind::PullRequest => self
                .fetch_pull_request(url, &locator)
                .await
                .map(ArtifactRecord::PullRequest),
        }
    }

    async fn fetch_issue(&self, url: &str) -> Result<IssueRecord> {
        let data = self
            .extract_payload(url, ISSUE_PROMPT, &issue_schema())
            .await?;

        let issue: IssueRecord = serde_json::from_value(data)
            .map_err(|e| Error::Parse(format!("extracted issue did not match schema: {}", e)))?;

        info!(
            number = issue.number,
            comments = issue.comments.len(),
            related = issue.related_items.len(),
            "Fetched issue"
        );

        Ok(issue)
    }

    async fn fetch_pull_request(
        &self,
        url: &str,
        locator: &ArtifactLocator,
    ) -> Result<PullRequestRecord> {
        let data = self
            .extract_payload(url, PULL_REQUEST_PROMPT, &pull_request_schema())
            .await?;

        let mut pr: PullRequestRecord = serde_json::from_value(data).map_err(|e| {
            Error::Parse(format!("extracted pull request did not match schema: {}", e))
        })?;

        let diff = self.fetch_diff(locator).await?;
        backfill_patches(&mut pr.file_changes, split_unified_diff(&diff));

        info!(
            number = pr.number,
            commits = pr.commits.len(),
            files = pr.file_changes.len(),
            "Fetched pull request"
        );

        Ok(pr)
    }
}

fn comment_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "author": { "type": "string" },
            "content": { "type": "string" },
            "created_at": { "type": "string" },
            "updated_at": { "type": "string" }
        },
        "required": ["author", "content", "created_at"]
    })
}

fn reference_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "kind": { "type": "string", "enum": ["issue", "pull_request", "commit"] },
            "number": { "type": "integer" },
            "sha": { "type": "string" },
            "title": { "type": "string" },
            "url": { "type": "string" }
        },
        "required": ["kind", "url"]
    })
}

fn issue_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "number": { "type": "integer" },
            "state": { "type": "string" },
            "author": { "type": "string" },
            "created_at": { "type": "string" },
            "updated_at": { "type": "string" },
            "body": { "type": "string" },
            "comments": { "type": "array", "items": comment_schema() },
            "labels": { "type": "array", "items": { "type": "string" } },
            "related_items": { "type": "array", "items": reference_schema() }
        },
        "required": ["title", "number", "state", "author", "created_at", "updated_at", "body"]
    })
}

fn pull_request_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "number": { "type": "integer" },
            "state": { "type": "string" },
            "author": { "type": "string" },
            "created_at": { "type": "string" },
            "updated_at": { "type": "string" },
            "merged_at": { "type": "string" },
            "body": { "type": "string" },
            "comments": { "type": "array", "items": comment_schema() },
            "commits": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "sha": { "type": "string" },
                        "message": { "type": "string" },
                        "author": { "type": "string" },
                        "created_at": { "type": "string" },
                        "url": { "type": "string" }
                    },
                    "required": ["sha", "message", "author", "created_at", "url"]
                }
            },
            "file_changes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "filename": { "type": "string" },
                        "status": { "type": "string" },
                        "additions": { "type": "integer" },
                        "deletions": { "type": "integer" },
                        "changes": { "type": "integer" },
                        "patch": { "type": "string" }
                    },
                    "required": ["filename", "status", "additions", "deletions", "changes"]
                }
            },
            "labels": { "type": "array", "items": { "type": "string" } },
            "related_items": { "type": "array", "items": reference_schema() }
        },
        "required": ["title", "number", "state", "author", "created_at", "updated_at", "body"]
    })
}
