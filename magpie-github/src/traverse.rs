//! Related-item traversal
//!
//! Depth-first, depth-bounded expansion over the graph of artifacts an
//! issue or PR references. The visited set is owned by one top-level run
//! and threaded by `&mut` through the whole call tree; a URL is inserted
//! *before* its fetch so cycles and self-references are caught on first
//! contact. A failing branch is contained at its parent: the reference
//! entry stays in place, annotated, with empty content.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use crate::format::format_artifact;
use crate::{ArtifactSource, Error, FormattedArtifact, ReferenceKind, Result};

/// Recursive expansion of an artifact and its related items
pub struct Traversal<'a> {
    source: &'a dyn ArtifactSource,
    include_kinds: Option<HashSet<ReferenceKind>>,
}

impl<'a> Traversal<'a> {
    /// Create a traversal over the given artifact source
    pub fn new(source: &'a dyn ArtifactSource) -> Self {
        Self {
            source,
            include_kinds: None,
        }
    }

    /// Restrict which reference kinds are expanded
    ///
    /// References of excluded kinds keep their entry in the document with
    /// empty content; they are never fetched and never enter the visited
    /// set, so the same URL stays expandable if reached on another path.
    pub fn include_kinds(mut self, kinds: impl IntoIterator<Item = ReferenceKind>) -> Self {
        self.include_kinds = Some(kinds.into_iter().collect());
        self
    }

    /// Fetch `url` and expand its related items up to `max_depth` edges deep
    ///
    /// Depth counts edges: `max_depth = 0` fetches the root only. A fetch
    /// failure on the root propagates; failures below the root are
    /// contained and demoted to annotated empty-content entries.
    pub async fn run(&self, url: &str, max_depth: u32) -> Result<FormattedArtifact> {
        let mut visited = HashSet::new();

        self.expand(url.to_string(), max_depth, &mut visited)
            .await?
            // the visited set is fresh, so the root is never a revisit
            .ok_or_else(|| Error::Other(format!("traversal of {} produced no document", url)))
    }

    /// One node of the traversal
    ///
    /// Returns `Ok(None)` when `url` was already entered during this call
    /// tree. The insert happens before the fetch so even a node whose
    /// first reference is itself resolves as already visited.
    fn expand<'s>(
        &'s self,
        url: String,
        depth: u32,
        visited: &'s mut HashSet<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Option<FormattedArtifact>>> + Send + 's>> {
        Box::pin(async move {
            if visited.contains(&url) {
                return Ok(None);
            }
            visited.insert(url.clone());

            debug!(url = %url, depth, "Expanding artifact");

            let record = self.source.fetch(&url).await?;
            let mut document = format_artifact(&record);

            if depth == 0 {
                return Ok(Some(document));
            }

            for (entry, reference) in document
                .related_items
                .iter_mut()
                .zip(record.related_items())
            {
                if let Some(ref kinds) = self.include_kinds {
                    if !kinds.contains(&reference.kind) {
                        continue;
                    }
                }

                if visited.contains(&reference.url) {
                    entry.reference.push_str(" [already visited]");
                    continue;
                }

                match self.expand(reference.url.clone(), depth - 1, visited).await {
                    Ok(Some(content)) => entry.content = Some(content),
                    Ok(None) => entry.reference.push_str(" [already visited]"),
                    Err(error) => {
                        warn!(url = %reference.url, %error, "Related item fetch failed");
                        entry
                            .reference
                            .push_str(&format!(" [fetch failed: {}]", error));
                    }
                }
            }

            Ok(Some(document))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArtifactRecord, ArtifactReference, Comment, IssueRecord, PullRequestRecord};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory artifact source recording every fetch
    struct StubSource {
        records: HashMap<String, ArtifactRecord>,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new(records: Vec<ArtifactRecord>) -> Self {
            let records = records
                .into_iter()
                .map(|record| (url_of(&record), record))
                .collect();
            Self {
                records,
                failing: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, url: &str) -> Self {
            self.failing.insert(url.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtifactSource for StubSource {
        async fn fetch(&self, url: &str) -> crate::Result<ArtifactRecord> {
            self.calls.lock().unwrap().push(url.to_string());
            if self.failing.contains(url) {
                return Err(Error::Extraction(format!("upstream broke on {}", url)));
            }
            self.records
                .get(url)
                .cloned()
                .ok_or_else(|| Error::NotFound(url.to_string()))
        }
    }

    fn url_of(record: &ArtifactRecord) -> String {
        let segment = match record {
            ArtifactRecord::Issue(_) => "issues",
            ArtifactRecord::PullRequest(_) => "pull",
        };
        format!("https://github.com/o/r/{}/{}", segment, record.number())
    }

    fn issue_url(number: u64) -> String {
        format!("https://github.com/o/r/issues/{}", number)
    }

    fn pull_url(number: u64) -> String {
        format!("https://github.com/o/r/pull/{}", number)
    }

    fn issue_ref(number: u64) -> ArtifactReference {
        ArtifactReference {
            kind: ReferenceKind::Issue,
            number: Some(number),
            sha: None,
            title: None,
            url: issue_url(number),
        }
    }

    fn pull_ref(number: u64) -> ArtifactReference {
        ArtifactReference {
            kind: ReferenceKind::PullRequest,
            number: Some(number),
            sha: None,
            title: None,
            url: pull_url(number),
        }
    }

    fn commit_ref(sha: &str) -> ArtifactReference {
        ArtifactReference {
            kind: ReferenceKind::Commit,
            number: None,
            sha: Some(sha.to_string()),
            title: None,
            url: format!("https://github.com/o/r/commit/{}", sha),
        }
    }

    fn issue(number: u64, related: Vec<ArtifactReference>) -> ArtifactRecord {
        ArtifactRecord::Issue(IssueRecord {
            title: format!("Issue {}", number),
            number,
            state: "open".to_string(),
            author: "alice".to_string(),
            created_at: "2024-01-01".to_string(),
            updated_at: "2024-01-02".to_string(),
            body: "body".to_string(),
            comments: vec![],
            labels: vec![],
            related_items: related,
        })
    }

    fn pull(number: u64, related: Vec<ArtifactReference>) -> ArtifactRecord {
        ArtifactRecord::PullRequest(PullRequestRecord {
            title: format!("PR {}", number),
            number,
            state: "open".to_string(),
            author: "carol".to_string(),
            created_at: "2024-01-03".to_string(),
            updated_at: "2024-01-04".to_string(),
            merged_at: None,
            body: "pr body".to_string(),
            comments: vec![Comment {
                author: "dave".to_string(),
                content: "lgtm".to_string(),
                created_at: "2024-01-05".to_string(),
                updated_at: None,
            }],
            commits: vec![],
            file_changes: vec![],
            labels: vec!["fix".to_string()],
            related_items: related,
        })
    }

    #[tokio::test]
    async fn test_depth_zero_leaves_every_entry_reference_only() {
        let source = StubSource::new(vec![issue(1, vec![pull_ref(2), commit_ref("abc")])]);

        let doc = Traversal::new(&source).run(&issue_url(1), 0).await.unwrap();

        assert_eq!(doc.related_items.len(), 2);
        assert!(doc.related_items.iter().all(|e| e.content.is_none()));
        assert_eq!(source.calls(), vec![issue_url(1)]);
    }

    #[tokio::test]
    async fn test_depth_one_expands_one_level_only() {
        // Root issue with one comment and one related PR; the PR points
        // further, but depth runs out there.
        let mut root = issue(1, vec![pull_ref(2)]);
        if let ArtifactRecord::Issue(ref mut record) = root {
            record.comments.push(Comment {
                author: "alice".to_string(),
                content: "first".to_string(),
                created_at: "2024-01-01".to_string(),
                updated_at: None,
            });
        }
        let source = StubSource::new(vec![root, pull(2, vec![issue_ref(3)])]);

        let doc = Traversal::new(&source).run(&issue_url(1), 1).await.unwrap();

        assert_eq!(doc.conversation.len(), 1);
        let nested = doc.related_items[0].content.as_ref().unwrap();
        assert_eq!(nested.number, 2);
        assert_eq!(nested.conversation.len(), 1);
        assert_eq!(nested.labels, vec!["fix".to_string()]);
        // remaining depth is 0 at that level
        assert_eq!(nested.related_items.len(), 1);
        assert!(nested.related_items[0].content.is_none());
        assert!(!source.calls().contains(&issue_url(3)));
    }

    #[tokio::test]
    async fn test_cycle_terminates_and_is_annotated() {
        let source = StubSource::new(vec![
            issue(1, vec![pull_ref(2)]),
            pull(2, vec![issue_ref(1)]),
        ]);

        let doc = Traversal::new(&source).run(&issue_url(1), 5).await.unwrap();

        let nested = doc.related_items[0].content.as_ref().unwrap();
        assert!(nested.related_items[0].reference.ends_with("[already visited]"));
        assert!(nested.related_items[0].content.is_none());
        // each node fetched exactly once
        assert_eq!(source.calls(), vec![issue_url(1), pull_url(2)]);
    }

    #[tokio::test]
    async fn test_failing_branch_does_not_abort_siblings() {
        let source = StubSource::new(vec![
            issue(1, vec![issue_ref(2), issue_ref(3)]),
            issue(3, vec![]),
        ])
        .failing(&issue_url(2));

        let doc = Traversal::new(&source).run(&issue_url(1), 2).await.unwrap();

        assert!(doc.related_items[0].content.is_none());
        assert!(doc.related_items[0]
            .reference
            .contains("[fetch failed: extraction service error"));
        assert_eq!(
            doc.related_items[1].content.as_ref().unwrap().number,
            3
        );
    }

    #[tokio::test]
    async fn test_root_failure_propagates() {
        let source = StubSource::new(vec![]).failing(&issue_url(1));

        let result = Traversal::new(&source).run(&issue_url(1), 1).await;

        assert!(matches!(result, Err(Error::Extraction(_))));
    }

    #[tokio::test]
    async fn test_kind_filter_nulls_content_but_keeps_entries() {
        let source = StubSource::new(vec![
            issue(1, vec![issue_ref(2), commit_ref("abc"), pull_ref(3)]),
            issue(2, vec![]),
            pull(3, vec![]),
        ]);

        let doc = Traversal::new(&source)
            .include_kinds([ReferenceKind::Issue])
            .run(&issue_url(1), 1)
            .await
            .unwrap();

        assert_eq!(doc.related_items.len(), 3);
        assert!(doc.related_items[0].content.is_some());
        assert!(doc.related_items[1].content.is_none());
        assert!(doc.related_items[2].content.is_none());
        // filtered references are never fetched
        assert_eq!(source.calls(), vec![issue_url(1), issue_url(2)]);
    }

    #[tokio::test]
    async fn test_duplicate_sibling_reference_expands_once() {
        let source = StubSource::new(vec![
            issue(1, vec![issue_ref(2), issue_ref(2)]),
            issue(2, vec![]),
        ]);

        let doc = Traversal::new(&source).run(&issue_url(1), 1).await.unwrap();

        assert!(doc.related_items[0].content.is_some());
        assert!(doc.related_items[1].content.is_none());
        assert!(doc.related_items[1].reference.ends_with("[already visited]"));
        assert_eq!(source.calls(), vec![issue_url(1), issue_url(2)]);
    }

    #[tokio::test]
    async fn test_self_reference_is_caught_by_insert_before_fetch() {
        let source = StubSource::new(vec![issue(1, vec![issue_ref(1)])]);

        let doc = Traversal::new(&source).run(&issue_url(1), 3).await.unwrap();

        assert!(doc.related_items[0].content.is_none());
        assert!(doc.related_items[0].reference.ends_with("[already visited]"));
        assert_eq!(source.calls(), vec![issue_url(1)]);
    }

    #[tokio::test]
    async fn test_missing_related_item_is_annotated_not_fatal() {
        // reference to an artifact the source has no record for
        let source = StubSource::new(vec![issue(1, vec![issue_ref(99)])]);

        let doc = Traversal::new(&source).run(&issue_url(1), 1).await.unwrap();

        assert!(doc.related_items[0].reference.contains("[fetch failed:"));
        assert!(doc.related_items[0].content.is_none());
    }
}
