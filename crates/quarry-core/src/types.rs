//! Domain types shared by all backend providers.

use serde::{Deserialize, Serialize};

/// How a caller intends to consume a file's content.
///
/// The intent is supplied by the caller, never inferred from the payload,
/// and doubles as the cache-key prefix so the same blob id can cache a
/// text and a binary representation independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentIntent {
    /// Decode the body as UTF-8 text.
    Text,
    /// Keep the body as raw bytes.
    Binary,
}

impl ContentIntent {
    /// Returns the cache-key prefix for this intent.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "blob",
        }
    }
}

/// A decoded file payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// UTF-8 text content.
    Text(String),
    /// Raw binary content.
    Binary(Vec<u8>),
}

impl Payload {
    /// Returns the intent this payload was decoded with.
    pub fn intent(&self) -> ContentIntent {
        match self {
            Self::Text(_) => ContentIntent::Text,
            Self::Binary(_) => ContentIntent::Binary,
        }
    }

    /// Returns the text content, if this is a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Binary(_) => None,
        }
    }

    /// Returns the payload as raw bytes regardless of intent.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    /// Returns the payload size in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns true if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Identifies a remote file without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Path relative to the repository root, without a leading slash.
    path: String,

    /// Provider blob id (or commit sha) used as a cache key, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    /// Optional human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl FileDescriptor {
    /// Creates a descriptor for the given path, trimming any leading slash.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: trim_leading_slash(path.into()),
            id: None,
            label: None,
        }
    }

    /// Attaches a content identifier (blob id or commit sha).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attaches a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the content identifier, if known.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the cache key for this descriptor under the given intent.
    ///
    /// Descriptors without a content identifier are not cacheable: the
    /// same path may point at different blobs across commits.
    pub fn cache_key(&self, intent: ContentIntent) -> Option<String> {
        self.id
            .as_deref()
            .map(|id| format!("{}:{}", intent.key_prefix(), id))
    }

    /// Returns the file extension: the final path segment after the last `.`.
    ///
    /// Matching is case-sensitive. Files without a `.` have no extension.
    pub fn extension(&self) -> Option<&str> {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Some(ext),
            _ => None,
        }
    }
}

/// A descriptor paired with its decoded content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// The file this content belongs to.
    pub file: FileDescriptor,
    /// The decoded payload.
    pub data: Payload,
}

/// A file to be written to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    path: String,
    payload: Payload,
}

impl WriteRequest {
    /// Creates a write request, trimming any leading slash from the path.
    pub fn new(path: impl Into<String>, payload: Payload) -> Self {
        Self {
            path: trim_leading_slash(path.into()),
            payload,
        }
    }

    /// Creates a text write request.
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(path, Payload::Text(content.into()))
    }

    /// Creates a binary write request.
    pub fn binary(path: impl Into<String>, content: Vec<u8>) -> Self {
        Self::new(path, Payload::Binary(content))
    }

    /// Returns the target path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// Options for a persist operation.
#[derive(Debug, Clone)]
pub struct PersistOptions {
    /// The commit message.
    pub commit_message: String,
    /// True when the target does not exist yet (commit action `create`).
    ///
    /// Callers must know; the backend does not probe for existence.
    pub new_entry: bool,
    /// Target branch. None means the configured default branch.
    pub branch: Option<String>,
}

impl PersistOptions {
    /// Creates persist options for a new entry.
    pub fn create(commit_message: impl Into<String>) -> Self {
        Self {
            commit_message: commit_message.into(),
            new_entry: true,
            branch: None,
        }
    }

    /// Creates persist options for updating an existing entry.
    pub fn update(commit_message: impl Into<String>) -> Self {
        Self {
            commit_message: commit_message.into(),
            new_entry: false,
            branch: None,
        }
    }

    /// Overrides the target branch.
    pub fn on_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Acknowledgement marker for a successfully persisted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFile {
    /// The path that was written, without a leading slash.
    pub path: String,
    /// Always true for a returned marker; failed uploads error instead.
    pub uploaded: bool,
}

/// The identity returned by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider-assigned numeric id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Login handle.
    pub username: String,
}

fn trim_leading_slash(path: String) -> String {
    match path.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => path,
    }
}
