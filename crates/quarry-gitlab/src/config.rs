//! GitLab backend configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use quarry_core::BackendError;

/// How edited content is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    /// Commits go straight to the target branch.
    Simple,
    /// Review/staging workflow. Not supported by the GitLab backend.
    EditorialWorkflow,
}

impl Default for PublishMode {
    fn default() -> Self {
        Self::Simple
    }
}

/// Configuration for the GitLab backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitLabConfig {
    /// The API root URL.
    #[serde(default = "default_api_root")]
    api_root: String,

    /// The repository identifier (e.g. "group/project").
    repo: String,

    /// Default branch for reads and writes.
    #[serde(default = "default_branch")]
    branch: String,

    /// The publishing mode.
    #[serde(default)]
    publish_mode: PublishMode,

    /// Per-request timeout.
    #[serde(default = "default_timeout", with = "duration_secs")]
    request_timeout: Duration,
}

fn default_api_root() -> String {
    "https://gitlab.com/api/v4".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl GitLabConfig {
    /// Creates a new builder for GitLabConfig.
    pub fn builder() -> GitLabConfigBuilder {
        GitLabConfigBuilder::default()
    }

    /// Returns the API root URL.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Returns the repository identifier.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Returns the default branch.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns the publishing mode.
    pub fn publish_mode(&self) -> PublishMode {
        self.publish_mode
    }

    /// Returns the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Builder for GitLabConfig.
#[derive(Debug, Default)]
pub struct GitLabConfigBuilder {
    api_root: Option<String>,
    repo: Option<String>,
    branch: Option<String>,
    publish_mode: Option<PublishMode>,
    request_timeout: Option<Duration>,
}

impl GitLabConfigBuilder {
    /// Sets the API root URL.
    pub fn api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = Some(api_root.into());
        self
    }

    /// Sets the repository identifier.
    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Sets the default branch.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Sets the publishing mode.
    pub fn publish_mode(mut self, mode: PublishMode) -> Self {
        self.publish_mode = Some(mode);
        self
    }

    /// Sets the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Fails before any network call when the repository identifier is
    /// missing or the publishing mode requires a workflow this backend
    /// does not support.
    pub fn build(self) -> Result<GitLabConfig, BackendError> {
        let publish_mode = self.publish_mode.unwrap_or_default();
        if publish_mode == PublishMode::EditorialWorkflow {
            return Err(BackendError::config(
                "the GitLab backend does not support the editorial workflow",
            ));
        }

        let repo = match self.repo {
            Some(repo) if !repo.trim().is_empty() => repo,
            _ => {
                return Err(BackendError::config(
                    "the GitLab backend needs a \"repo\" in the backend configuration",
                ));
            }
        };

        Ok(GitLabConfig {
            api_root: self
                .api_root
                .map(|root| root.trim_end_matches('/').to_string())
                .unwrap_or_else(default_api_root),
            repo,
            branch: self.branch.unwrap_or_else(default_branch),
            publish_mode,
            request_timeout: self.request_timeout.unwrap_or_else(default_timeout),
        })
    }
}

mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
