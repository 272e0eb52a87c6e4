//! GitLab REST API client and wire types.

mod client;
mod types;

pub use client::{ApiClient, PROVIDER};
pub use types::{
    AccessLevel, CommitAction, CommitRequest, CommitResponse, GitLabUser, Permissions, Project,
    TreeEntry, TreeEntryKind,
};
