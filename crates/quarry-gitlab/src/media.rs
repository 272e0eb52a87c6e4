//! Lazy media blob handles.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use quarry_core::{BackendError, ContentIntent, FileDescriptor, MediaBlob, Payload, Result};

use crate::api::{ApiClient, PROVIDER};
use crate::cache::BlobCache;

/// Resolves one media file's binary payload on demand.
///
/// Handles produced by a single media listing share one semaphore, so
/// however many blobs the application resolves at once, at most the
/// configured number of downloads are in flight.
pub struct GitLabMediaBlob {
    pub(crate) api: Arc<ApiClient>,
    pub(crate) cache: BlobCache,
    pub(crate) file: FileDescriptor,
    pub(crate) branch: String,
    pub(crate) slots: Arc<Semaphore>,
}

#[async_trait]
impl MediaBlob for GitLabMediaBlob {
    async fn resolve(&self) -> Result<Vec<u8>> {
        if let Some(hit) = self.cache.get(&self.file, ContentIntent::Binary).await {
            return Ok(hit.as_bytes().to_vec());
        }

        // The permit drops on every exit path, success or failure.
        let _permit = self
            .slots
            .acquire()
            .await
            .map_err(|_| BackendError::api(PROVIDER, None, "download slot pool closed", None))?;

        let payload = self
            .api
            .read_raw_file(self.file.path(), &self.branch, ContentIntent::Binary)
            .await?;

        let bytes = payload.as_bytes().to_vec();
        self.cache.insert(&self.file, payload).await;
        Ok(bytes)
    }
}
