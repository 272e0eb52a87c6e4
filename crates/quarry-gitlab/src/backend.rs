//! GitLab backend facade.
//!
//! Composes the API client, blob cache, commit builder and access check
//! into the application-facing [`ContentBackend`] contract. The facade
//! is unauthenticated until [`ContentBackend::authenticate`] opens a
//! session and becomes unauthenticated again after
//! [`ContentBackend::logout`].

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use quarry_core::{
    BackendError, ContentBackend, ContentIntent, Credential, Cursor, FileContent, FileDescriptor,
    MAX_CONCURRENT_DOWNLOADS, MediaFile, Payload, PersistOptions, PersistedFile, Result, User,
    WriteRequest, fetch_all,
};

use crate::access::has_write_access;
use crate::api::{ApiClient, CommitResponse, TreeEntry, TreeEntryKind};
use crate::cache::BlobCache;
use crate::commit::build_commit;
use crate::config::GitLabConfig;
use crate::media::GitLabMediaBlob;

/// An authenticated session: the credential plus the identity it belongs
/// to. Created by `authenticate`, destroyed by `logout`.
#[derive(Debug, Clone)]
struct Session {
    credential: Credential,
    user: User,
}

/// The GitLab conforming module of the backend contract.
pub struct GitLabBackend {
    api: Arc<ApiClient>,
    cache: BlobCache,
    config: GitLabConfig,
    session: RwLock<Option<Session>>,
}

impl GitLabBackend {
    /// Creates a backend from a validated configuration. No network call.
    pub fn new(config: GitLabConfig) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config)?);

        Ok(Self {
            api,
            cache: BlobCache::new(),
            config,
            session: RwLock::new(None),
        })
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &GitLabConfig {
        &self.config
    }

    /// Returns the identity of the active session, if any.
    pub fn current_user(&self) -> Option<User> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    /// Returns the raw-content download URL for a file on the default
    /// branch, for direct media display.
    pub fn file_download_url(&self, path: &str) -> String {
        self.api.file_download_url(path, self.config.branch())
    }

    /// Lists one page of blob entries under `folder`, returning the
    /// page's files plus a resumable cursor.
    pub async fn list_page(
        &self,
        folder: &str,
        page: Option<&str>,
    ) -> Result<(Vec<FileDescriptor>, Cursor)> {
        let (entries, next) = self
            .api
            .tree_page(folder, self.config.branch(), page)
            .await?;

        let files = entries.into_iter().filter_map(blob_descriptor).collect();
        Ok((files, Cursor::from_page_token(folder, next)))
    }

    /// Lists every blob entry under `folder`, eagerly draining all pages.
    pub async fn list_all(&self, folder: &str) -> Result<Vec<FileDescriptor>> {
        let mut files = Vec::new();
        let mut page: Option<String> = None;

        loop {
            let (batch, cursor) = self.list_page(folder, page.as_deref()).await?;
            files.extend(batch);
            match cursor.next_page() {
                Some(next) => page = Some(next.to_string()),
                None => break,
            }
        }

        debug!(folder, files = files.len(), "listed all files");
        Ok(files)
    }

    /// Persists several write requests as one commit, returning an
    /// acknowledgement marker per input.
    pub async fn persist(
        &self,
        requests: &[WriteRequest],
        options: &PersistOptions,
    ) -> Result<Vec<PersistedFile>> {
        self.require_session()?;

        let commit = build_commit(requests, options, self.config.branch())?;
        let response: CommitResponse = self.api.create_commit(&commit).await?;

        info!(
            commit = %response.short_id,
            files = requests.len(),
            "persisted files"
        );

        Ok(requests
            .iter()
            .map(|request| PersistedFile {
                path: request.path().to_string(),
                uploaded: true,
            })
            .collect())
    }

    fn require_session(&self) -> Result<Session> {
        self.session
            .read()
            .clone()
            .ok_or(BackendError::NotAuthenticated)
    }

    /// Reads one file through the cache. A miss falls through to the
    /// raw-content endpoint and populates the cache when the descriptor
    /// carries a blob id.
    async fn read_cached(&self, file: &FileDescriptor, intent: ContentIntent) -> Result<Payload> {
        if let Some(hit) = self.cache.get(file, intent).await {
            return Ok((*hit).clone());
        }

        let payload = self
            .api
            .read_raw_file(file.path(), self.config.branch(), intent)
            .await?;
        self.cache.insert(file, payload.clone()).await;
        Ok(payload)
    }

    /// Fetches text content for a set of descriptors under the download
    /// cap, preserving input order.
    async fn fetch_contents(&self, files: Vec<FileDescriptor>) -> Result<Vec<FileContent>> {
        fetch_all(files, MAX_CONCURRENT_DOWNLOADS, |file| async move {
            let data = self.read_cached(&file, ContentIntent::Text).await?;
            Ok(FileContent { file, data })
        })
        .await
    }
}

#[async_trait]
impl ContentBackend for GitLabBackend {
    async fn authenticate(&self, credential: Credential) -> Result<User> {
        self.api.set_token(credential.clone());

        let result = async {
            let gitlab_user = self.api.user().await?;
            let project = self.api.project().await?;

            if !has_write_access(&project.permissions) {
                return Err(BackendError::permission(
                    "your GitLab user account does not have write access to this repository",
                ));
            }

            Ok(User {
                id: gitlab_user.id,
                name: gitlab_user.name,
                username: gitlab_user.username,
            })
        }
        .await;

        match result {
            Ok(user) => {
                info!(username = %user.username, "authenticated");
                *self.session.write() = Some(Session {
                    credential,
                    user: user.clone(),
                });
                Ok(user)
            }
            Err(err) => {
                // Leave the facade unusable rather than half-authenticated.
                self.api.clear_token();
                Err(err)
            }
        }
    }

    async fn logout(&self) {
        *self.session.write() = None;
        self.api.clear_token();
        info!("logged out");
    }

    fn token(&self) -> Option<Credential> {
        self.session.read().as_ref().map(|s| s.credential.clone())
    }

    async fn entries_by_folder(
        &self,
        folder: &str,
        extension: &str,
    ) -> Result<(Vec<FileContent>, Cursor)> {
        self.require_session()?;

        let (files, cursor) = self.list_page(folder, None).await?;
        let matching = filter_extension(files, extension);
        let entries = self.fetch_contents(matching).await?;
        Ok((entries, cursor))
    }

    async fn all_entries_by_folder(
        &self,
        folder: &str,
        extension: &str,
    ) -> Result<Vec<FileContent>> {
        self.require_session()?;

        let files = self.list_all(folder).await?;
        let matching = filter_extension(files, extension);
        self.fetch_contents(matching).await
    }

    async fn entries_by_files(&self, files: Vec<FileDescriptor>) -> Result<Vec<FileContent>> {
        self.require_session()?;
        self.fetch_contents(files).await
    }

    async fn get_entry(&self, path: &str) -> Result<FileContent> {
        self.require_session()?;

        let file = FileDescriptor::new(path);
        let data = self.read_cached(&file, ContentIntent::Text).await?;
        Ok(FileContent { file, data })
    }

    async fn persist_entry(
        &self,
        entry: WriteRequest,
        options: &PersistOptions,
    ) -> Result<PersistedFile> {
        let mut persisted = self.persist(std::slice::from_ref(&entry), options).await?;
        // One request in, one marker out.
        Ok(persisted.remove(0))
    }

    async fn persist_media(
        &self,
        file: WriteRequest,
        options: &PersistOptions,
    ) -> Result<PersistedFile> {
        let mut persisted = self.persist(std::slice::from_ref(&file), options).await?;
        Ok(persisted.remove(0))
    }

    async fn delete_file(
        &self,
        path: &str,
        commit_message: &str,
        branch: Option<&str>,
    ) -> Result<()> {
        self.require_session()?;

        let branch = branch.unwrap_or(self.config.branch());
        let path = path.strip_prefix('/').unwrap_or(path);
        self.api.delete_file(path, branch, commit_message).await?;

        info!(path, branch, "deleted file");
        Ok(())
    }

    async fn media_files(&self, folder: &str) -> Result<Vec<MediaFile>> {
        self.require_session()?;

        let files = self.list_all(folder).await?;
        // Every handle from this listing shares one slot pool.
        let slots = Arc::new(Semaphore::new(MAX_CONCURRENT_DOWNLOADS));

        Ok(files
            .into_iter()
            .map(|file| {
                let name = file
                    .path()
                    .rsplit('/')
                    .next()
                    .unwrap_or(file.path())
                    .to_string();

                MediaFile {
                    id: file.id().map(str::to_string),
                    name,
                    path: file.path().to_string(),
                    blob: Arc::new(GitLabMediaBlob {
                        api: Arc::clone(&self.api),
                        cache: self.cache.clone(),
                        branch: self.config.branch().to_string(),
                        slots: Arc::clone(&slots),
                        file,
                    }),
                }
            })
            .collect())
    }

    async fn traverse_cursor(&self, cursor: &Cursor) -> Result<(Vec<FileContent>, Cursor)> {
        self.require_session()?;

        // Terminal cursors answer locally.
        let Some(page) = cursor.next_page() else {
            return Ok((Vec::new(), Cursor::done(cursor.folder())));
        };

        let (files, next_cursor) = self.list_page(cursor.folder(), Some(page)).await?;
        let entries = self.fetch_contents(files).await?;
        Ok((entries, next_cursor))
    }
}

impl std::fmt::Debug for GitLabBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabBackend")
            .field("repo", &self.config.repo())
            .field("branch", &self.config.branch())
            .field("authenticated", &self.session.read().is_some())
            .finish()
    }
}

fn blob_descriptor(entry: TreeEntry) -> Option<FileDescriptor> {
    match entry.kind {
        TreeEntryKind::Blob => Some(FileDescriptor::new(entry.path).with_id(entry.id)),
        TreeEntryKind::Tree => None,
    }
}

fn filter_extension(files: Vec<FileDescriptor>, extension: &str) -> Vec<FileDescriptor> {
    files
        .into_iter()
        .filter(|file| file.extension() == Some(extension))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GitLabBackend {
        let config = GitLabConfig::builder()
            .repo("group/project")
            .build()
            .unwrap();
        GitLabBackend::new(config).unwrap()
    }

    #[test]
    fn test_unauthenticated_by_default() {
        let backend = backend();
        assert!(backend.token().is_none());
        assert!(backend.require_session().is_err());
    }

    #[tokio::test]
    async fn test_operations_require_session() {
        let backend = backend();

        let err = backend.get_entry("posts/a.md").await.unwrap_err();
        assert!(matches!(err, BackendError::NotAuthenticated));

        let err = backend
            .persist_entry(
                WriteRequest::text("posts/a.md", "x"),
                &PersistOptions::create("add"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotAuthenticated));

        let err = backend.delete_file("posts/a.md", "remove", None).await.unwrap_err();
        assert!(matches!(err, BackendError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_traverse_terminal_cursor_is_local() {
        let backend = backend();
        *backend.session.write() = Some(Session {
            credential: Credential::new("tok"),
            user: User {
                id: 1,
                name: "Test".to_string(),
                username: "test".to_string(),
            },
        });

        // No network is reachable in this test; a terminal cursor must
        // still answer immediately.
        let cursor = Cursor::done("posts");
        let (entries, next) = backend.traverse_cursor(&cursor).await.unwrap();
        assert!(entries.is_empty());
        assert!(!next.has_next());
        assert_eq!(next.folder(), "posts");
    }

    #[test]
    fn test_filter_extension_is_case_sensitive() {
        let files = vec![
            FileDescriptor::new("posts/a.md"),
            FileDescriptor::new("posts/b.MD"),
            FileDescriptor::new("posts/c.txt"),
        ];
        let matching = filter_extension(files, "md");
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].path(), "posts/a.md");
    }

    #[test]
    fn test_blob_descriptor_skips_trees() {
        let entry: TreeEntry = serde_json::from_str(
            r#"{"id": "abc", "name": "drafts", "type": "tree", "path": "posts/drafts"}"#,
        )
        .unwrap();
        assert!(blob_descriptor(entry).is_none());

        let entry: TreeEntry = serde_json::from_str(
            r#"{"id": "abc", "name": "post.md", "type": "blob", "path": "posts/post.md"}"#,
        )
        .unwrap();
        let file = blob_descriptor(entry).unwrap();
        assert_eq!(file.path(), "posts/post.md");
        assert_eq!(file.id(), Some("abc"));
    }
}
