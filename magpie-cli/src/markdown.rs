//! Markdown rendering of formatted artifacts
//!
//! Produces the human-readable narrative form of a document. Traversed
//! related items render as nested sections with their headings pushed
//! down two levels per nesting step.

use magpie_github::{ArtifactKind, FormattedArtifact};

/// Render the document as a Markdown narrative
pub fn render(document: &FormattedArtifact) -> String {
    let mut out = String::new();
    render_into(&mut out, document, 1);
    out
}

fn render_into(out: &mut String, doc: &FormattedArtifact, level: usize) {
    let kind_label = match doc.kind {
        ArtifactKind::Issue => "Issue",
        ArtifactKind::PullRequest => "Pull Request",
    };

    out.push_str(&format!(
        "{} {} #{}: {}\n\n",
        heading(level),
        kind_label,
        doc.number,
        doc.title
    ));

    out.push_str(&format!("**State:** {}  \n", doc.state));
    out.push_str(&format!("**Author:** {}  \n", doc.author));
    out.push_str(&format!("**Created:** {}  \n", doc.created_at));
    if let Some(ref merged_at) = doc.merged_at {
        out.push_str(&format!("**Merged:** {}  \n", merged_at));
    }
    out.push('\n');

    let section = heading(level + 1);

    out.push_str(&format!("{} Description\n\n{}\n\n", section, doc.description));

    if !doc.labels.is_empty() {
        let labels: Vec<String> = doc.labels.iter().map(|l| format!("`{}`", l)).collect();
        out.push_str(&format!("{} Labels\n\n{}\n\n", section, labels.join(", ")));
    }

    if !doc.conversation.is_empty() {
        out.push_str(&format!("{} Conversation\n\n", section));
        for comment in &doc.conversation {
            out.push_str(comment);
            out.push_str("\n\n---\n\n");
        }
    }

    if let Some(ref commits) = doc.commits {
        if !commits.is_empty() {
            out.push_str(&format!("{} Commits\n\n", section));
            for commit in commits {
                out.push_str(&format!("* {}\n", commit));
            }
            out.push('\n');
        }
    }

    if let Some(ref file_changes) = doc.file_changes {
        if !file_changes.is_empty() {
            out.push_str(&format!("{} File Changes\n\n", section));
            for change in file_changes {
                out.push_str(&format!(
                    "{} {} ({}, {})\n\n",
                    heading(level + 2),
                    change.filename,
                    change.status,
                    change.changes
                ));
                if let Some(ref patch) = change.patch {
                    out.push_str(&format!("```diff\n{}\n```\n\n", patch));
                }
            }
        }
    }

    if !doc.related_items.is_empty() {
        out.push_str(&format!("{} Related Items\n\n", section));
        for entry in &doc.related_items {
            out.push_str(&format!("* {}\n", entry.reference));
        }
        out.push('\n');

        for entry in &doc.related_items {
            if let Some(ref content) = entry.content {
                render_into(out, content, level + 2);
            }
        }
    }
}

/// Markdown heading prefix, clamped to the h6 limit
fn heading(level: usize) -> String {
    "#".repeat(level.min(6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_github::{FormattedFileChange, RelatedEntry};

    fn issue_doc(number: u64) -> FormattedArtifact {
        FormattedArtifact {
            kind: ArtifactKind::Issue,
            title: format!("Issue {}", number),
            number,
            state: "open".to_string(),
            author: "alice".to_string(),
            created_at: "2024-05-01".to_string(),
            merged_at: None,
            description: "Something broke.".to_string(),
            conversation: vec!["**bob** (2024-05-01):\nSame here.".to_string()],
            commits: None,
            file_changes: None,
            labels: vec!["bug".to_string()],
            related_items: vec![],
        }
    }

    #[test]
    fn test_issue_sections() {
        let md = render(&issue_doc(10));

        assert!(md.starts_with("# Issue #10: Issue 10\n"));
        assert!(md.contains("**State:** open"));
        assert!(md.contains("## Description\n\nSomething broke."));
        assert!(md.contains("## Labels\n\n`bug`"));
        assert!(md.contains("## Conversation\n\n**bob**"));
        assert!(!md.contains("Merged:"));
    }

    #[test]
    fn test_pull_request_sections_with_fenced_patch() {
        let doc = FormattedArtifact {
            kind: ArtifactKind::PullRequest,
            title: "Fix parser".to_string(),
            number: 11,
            state: "merged".to_string(),
            author: "carol".to_string(),
            created_at: "2024-05-03".to_string(),
            merged_at: Some("2024-05-04".to_string()),
            description: "Fixes #10".to_string(),
            conversation: vec![],
            commits: Some(vec!["abcdef1: fix (by carol on 2024-05-03)".to_string()]),
            file_changes: Some(vec![FormattedFileChange {
                filename: "src/parser.rs".to_string(),
                status: "modified".to_string(),
                changes: "+4 -1".to_string(),
                patch: Some("@@ -1 +1,4 @@".to_string()),
            }]),
            labels: vec![],
            related_items: vec![],
        };

        let md = render(&doc);

        assert!(md.starts_with("# Pull Request #11: Fix parser\n"));
        assert!(md.contains("**Merged:** 2024-05-04"));
        assert!(md.contains("## Commits\n\n* abcdef1: fix"));
        assert!(md.contains("### src/parser.rs (modified, +4 -1)"));
        assert!(md.contains("```diff\n@@ -1 +1,4 @@\n```"));
    }

    #[test]
    fn test_nested_related_items_push_headings_down() {
        let mut root = issue_doc(1);
        root.related_items = vec![
            RelatedEntry {
                reference: "issue 2: Child (https://github.com/o/r/issues/2)".to_string(),
                content: Some(issue_doc(2)),
            },
            RelatedEntry {
                reference: "commit abc:  (https://github.com/o/r/commit/abc)".to_string(),
                content: None,
            },
        ];

        let md = render(&root);

        assert!(md.contains("## Related Items\n\n* issue 2: Child"));
        assert!(md.contains("* commit abc:"));
        // nested document starts two levels below the root heading
        assert!(md.contains("### Issue #2: Issue 2"));
        assert!(md.contains("#### Description"));
    }

    #[test]
    fn test_heading_is_clamped() {
        assert_eq!(heading(4), "####");
        assert_eq!(heading(9), "######");
    }
}
