//! Magpie GitHub - issue and pull request extraction for LLM consumption
//!
//! This crate turns a GitHub issue or pull request URL into a structured
//! record via an external extraction service, renders it as a flat
//! LLM-friendly document, and can recursively expand the related items the
//! artifact references (other issues, PRs, commits) up to a bounded depth.

mod client;
mod diff;
mod error;
mod fetch;
mod format;
mod locator;
mod model;
mod traverse;

pub use client::{ArtifactSource, ExtractorClient};
pub use diff::{backfill_patches, split_unified_diff, FilePatch};
pub use error::{Error, Result};
pub use format::{format_artifact, FormattedArtifact, FormattedFileChange, RelatedEntry};
pub use locator::{ArtifactKind, ArtifactLocator};
pub use model::{
    ArtifactRecord, ArtifactReference, Comment, Commit, FileChange, IssueRecord,
    PullRequestRecord, ReferenceKind,
};
pub use traverse::Traversal;
