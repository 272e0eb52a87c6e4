//! The application-facing backend contract.
//!
//! Each git hosting provider ships one conforming module implementing
//! [`ContentBackend`]; the application selects a provider at configuration
//! time and uses it through this trait. Composition, not inheritance.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cursor::Cursor;
use crate::error::Result;
use crate::types::{FileContent, FileDescriptor, PersistOptions, PersistedFile, User, WriteRequest};

/// An opaque bearer credential obtained from the authentication step.
///
/// The wrapped token is never logged and never serialized; it travels
/// only in request headers for the lifetime of a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Exposes the raw token for use in an authorization header.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// A lazily-resolvable media payload.
///
/// Listing a media folder returns one handle per file instead of eagerly
/// materializing every binary blob; callers resolve individual blobs on
/// demand. Resolution goes through the provider's cache and download cap.
#[async_trait]
pub trait MediaBlob: Send + Sync {
    /// Downloads (or recalls from cache) the binary payload.
    async fn resolve(&self) -> Result<Vec<u8>>;
}

/// A media file reference produced by a media-folder listing.
#[derive(Clone)]
pub struct MediaFile {
    /// Provider blob id, when known.
    pub id: Option<String>,
    /// File name (final path segment).
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    /// Lazy handle to the binary content.
    pub blob: Arc<dyn MediaBlob>,
}

impl fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

/// A git-hosted content backend.
///
/// Implementations are stateless per call apart from the session slot:
/// `authenticate` opens a session, `logout` closes it, and every other
/// operation requires one. All operations return an eventual result;
/// failures propagate as [`crate::BackendError`] without retries.
///
/// Listing contracts are explicit: [`Self::entries_by_folder`] returns one
/// page plus a resumable [`Cursor`], while [`Self::all_entries_by_folder`]
/// eagerly drains every page.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Stores the credential, fetches the current user and verifies write
    /// access. The session opens only if the access check passes.
    async fn authenticate(&self, credential: Credential) -> Result<User>;

    /// Clears the credential and closes the session.
    async fn logout(&self);

    /// Returns the active bearer token, if a session is open.
    fn token(&self) -> Option<Credential>;

    /// Lists one page of entries under `folder` whose file extension
    /// equals `extension`, fetching their text content.
    async fn entries_by_folder(
        &self,
        folder: &str,
        extension: &str,
    ) -> Result<(Vec<FileContent>, Cursor)>;

    /// Lists every entry under `folder` with the given extension across
    /// all pages, fetching their text content.
    async fn all_entries_by_folder(
        &self,
        folder: &str,
        extension: &str,
    ) -> Result<Vec<FileContent>>;

    /// Fetches the text content of an explicit set of files, skipping the
    /// listing step.
    async fn entries_by_files(&self, files: Vec<FileDescriptor>) -> Result<Vec<FileContent>>;

    /// Reads a single entry. Not subject to the download cap.
    async fn get_entry(&self, path: &str) -> Result<FileContent>;

    /// Persists one entry as a single commit.
    async fn persist_entry(
        &self,
        entry: WriteRequest,
        options: &PersistOptions,
    ) -> Result<PersistedFile>;

    /// Persists one media file as a single commit.
    async fn persist_media(
        &self,
        file: WriteRequest,
        options: &PersistOptions,
    ) -> Result<PersistedFile>;

    /// Deletes a file with its own commit. Not batched.
    async fn delete_file(
        &self,
        path: &str,
        commit_message: &str,
        branch: Option<&str>,
    ) -> Result<()>;

    /// Lists every file under the media folder, returning lazy handles.
    async fn media_files(&self, folder: &str) -> Result<Vec<MediaFile>>;

    /// Fetches the next page recorded in `cursor` and the entries' content.
    ///
    /// Terminal cursors yield an empty page and another terminal cursor
    /// without a network call.
    async fn traverse_cursor(&self, cursor: &Cursor) -> Result<(Vec<FileContent>, Cursor)>;
}
