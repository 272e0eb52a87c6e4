//! Authenticated HTTP wrapper over the GitLab v4 REST API.
//!
//! Builds cache-busted, bearer-authenticated requests against the
//! configured API root, decodes responses per the caller's intent and
//! turns every non-2xx response or network failure into a typed
//! [`BackendError::Api`]. No retries happen at this layer.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use quarry_core::{BackendError, ContentIntent, Credential, Payload, Result};

use crate::api::types::{CommitRequest, CommitResponse, GitLabUser, Project, TreeEntry};
use crate::config::GitLabConfig;

/// Provider tag carried by every API error from this client.
pub const PROVIDER: &str = "gitlab";

/// Response header carrying the next page number of a paginated listing.
const NEXT_PAGE_HEADER: &str = "X-Next-Page";

/// A thin, stateless-per-call client for one GitLab repository.
pub struct ApiClient {
    http: reqwest::Client,
    api_root: String,
    repo_path: String,
    token: RwLock<Option<Credential>>,
}

impl ApiClient {
    /// Creates a client for the configured repository. No network call.
    pub fn new(config: &GitLabConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| BackendError::api(PROVIDER, None, e.to_string(), None))?;

        Ok(Self {
            http,
            api_root: config.api_root().to_string(),
            repo_path: format!("/projects/{}", urlencoding::encode(config.repo())),
            token: RwLock::new(None),
        })
    }

    /// Installs the bearer credential used by subsequent requests.
    pub fn set_token(&self, credential: Credential) {
        *self.token.write() = Some(credential);
    }

    /// Clears the bearer credential.
    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    /// Returns the installed credential, if any.
    pub fn token(&self) -> Option<Credential> {
        self.token.read().clone()
    }

    /// Returns a path under the configured repository.
    pub fn repo_path(&self, suffix: &str) -> String {
        format!("{}{}", self.repo_path, suffix)
    }

    /// Returns the raw-content download URL for a file, usable directly
    /// by the application for media display.
    pub fn file_download_url(&self, path: &str, branch: &str) -> String {
        format!(
            "{}{}/repository/files/{}/raw?ref={}",
            self.api_root,
            self.repo_path,
            urlencoding::encode(path),
            urlencoding::encode(branch)
        )
    }

    // Endpoint wrappers -----------------------------------------------------

    /// `GET /user` - the authenticated identity.
    pub async fn user(&self) -> Result<GitLabUser> {
        self.get_json("/user", &[]).await
    }

    /// `GET /projects/:id` - project metadata including permissions.
    pub async fn project(&self) -> Result<Project> {
        self.get_json(&self.repo_path(""), &[]).await
    }

    /// `GET /projects/:id/repository/tree` - one page of a tree listing.
    ///
    /// Returns the page's entries plus the next-page token from the
    /// response header, as an explicit return value.
    pub async fn tree_page(
        &self,
        folder: &str,
        branch: &str,
        page: Option<&str>,
    ) -> Result<(Vec<TreeEntry>, Option<String>)> {
        let page = page.unwrap_or("1");
        let params = [("path", folder), ("ref", branch), ("page", page)];
        self.get_paginated_json(&self.repo_path("/repository/tree"), &params)
            .await
    }

    /// `GET /projects/:id/repository/files/:path/raw` - file content,
    /// decoded per the caller's intent.
    pub async fn read_raw_file(
        &self,
        path: &str,
        branch: &str,
        intent: ContentIntent,
    ) -> Result<Payload> {
        let endpoint = format!(
            "{}/repository/files/{}/raw",
            self.repo_path,
            urlencoding::encode(path)
        );
        let response = self
            .send(Method::GET, &endpoint, &[("ref", branch)], None::<&()>)
            .await?;

        match intent {
            ContentIntent::Text => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| BackendError::decode(path, e.to_string()))?;
                Ok(Payload::Text(text))
            }
            ContentIntent::Binary => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| BackendError::decode(path, e.to_string()))?;
                Ok(Payload::Binary(bytes.to_vec()))
            }
        }
    }

    /// `POST /projects/:id/repository/commits` - apply a commit.
    pub async fn create_commit(&self, commit: &CommitRequest) -> Result<CommitResponse> {
        debug!(
            branch = %commit.branch,
            actions = commit.actions.len(),
            "creating commit"
        );
        self.post_json(&self.repo_path("/repository/commits"), commit)
            .await
    }

    /// `DELETE /projects/:id/repository/files/:path` - delete one file
    /// with its own commit.
    pub async fn delete_file(&self, path: &str, branch: &str, commit_message: &str) -> Result<()> {
        let endpoint = format!(
            "{}/repository/files/{}",
            self.repo_path,
            urlencoding::encode(path)
        );
        let params = [("branch", branch), ("commit_message", commit_message)];
        // Empty body on DELETE is success.
        self.send(Method::DELETE, &endpoint, &params, None::<&()>)
            .await?;
        Ok(())
    }

    // Request plumbing ------------------------------------------------------

    /// GETs a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let response = self.send(Method::GET, path, params, None::<&()>).await?;
        decode_json(path, response).await
    }

    /// GETs a JSON body plus the next-page token from the response header.
    async fn get_paginated_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<(T, Option<String>)> {
        let response = self.send(Method::GET, path, params, None::<&()>).await?;

        let next_page = response
            .headers()
            .get(NEXT_PAGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let value = decode_json(path, response).await?;
        Ok((value, next_page))
    }

    /// POSTs a JSON body and decodes a JSON response.
    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.send(Method::POST, path, &[], Some(body)).await?;
        decode_json(path, response).await
    }

    /// Issues one request: cache-busted URL, caller parameters, bearer
    /// header when a credential is installed, and status check. Network
    /// failures and non-2xx statuses become [`BackendError::Api`].
    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.api_root, path);

        let mut request = self
            .http
            .request(method, &url)
            .query(&[("ts", cache_buster().as_str())])
            .query(params);

        if let Some(credential) = self.token() {
            request = request.bearer_auth(credential.reveal());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::api(PROVIDER, None, e.to_string(), None))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(status, response).await)
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_root", &self.api_root)
            .field("repo_path", &self.repo_path)
            .field("has_token", &self.token.read().is_some())
            .finish()
    }
}

/// Millisecond timestamp appended to every URL so intermediary caches
/// never serve a stale listing.
fn cache_buster() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    millis.to_string()
}

async fn decode_json<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| BackendError::decode(path, e.to_string()))
}

/// Builds the uniform API error from a non-2xx response: the message
/// prefers the error object's `message`/`error` field and falls back to
/// the raw text; the raw body rides along for diagnostics.
async fn error_from_response(status: StatusCode, response: Response) -> BackendError {
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body);
    BackendError::api(
        PROVIDER,
        Some(status.as_u16()),
        message,
        if body.is_empty() { None } else { Some(body) },
    )
}

fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key) {
                return match msg.as_str() {
                    Some(s) => s.to_string(),
                    None => msg.to_string(),
                };
            }
        }
    }
    body.trim().to_string()
}
