//! Wire types for the GitLab v4 REST API.

use serde::{Deserialize, Serialize};

/// The authenticated user, from `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUser {
    pub id: u64,
    pub name: String,
    pub username: String,
}

/// Project envelope, from `GET /projects/:id`. Only the permissions
/// object is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub permissions: Permissions,
}

/// The two permission sources GitLab reports for a project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Permissions {
    /// Direct project-level access, if any.
    #[serde(default)]
    pub project_access: Option<AccessLevel>,
    /// Inherited group-level access, if any.
    #[serde(default)]
    pub group_access: Option<AccessLevel>,
}

/// An ordinal access level.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AccessLevel {
    pub access_level: u32,
}

/// One node of a repository tree listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    /// Blob or tree object id.
    pub id: String,
    /// Final path segment.
    pub name: String,
    /// `"blob"` for files, `"tree"` for directories.
    #[serde(rename = "type")]
    pub kind: TreeEntryKind,
    /// Path relative to the repository root.
    pub path: String,
}

/// The kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEntryKind {
    Blob,
    Tree,
}

/// One file action within a commit, `POST /projects/:id/repository/commits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitAction {
    /// `"create"`, `"update"` or `"delete"`.
    pub action: &'static str,
    pub file_path: String,
    pub content: String,
    pub encoding: &'static str,
}

/// A commit creation request.
#[derive(Debug, Clone, Serialize)]
pub struct CommitRequest {
    pub branch: String,
    pub commit_message: String,
    pub actions: Vec<CommitAction>,
}

/// The provider's acknowledgement of a created commit.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitResponse {
    pub id: String,
    pub short_id: String,
    pub message: String,
}
