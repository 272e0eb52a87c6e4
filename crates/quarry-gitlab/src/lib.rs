//! # Quarry GitLab Backend
//!
//! Stores Quarry content through the GitLab v4 REST API: collections of
//! text and media entries map onto branches, trees, blobs and commits,
//! with pagination, authentication and partial-failure concerns hidden
//! behind the [`quarry_core::ContentBackend`] contract.
//!
//! This layer is a thin, stateless-per-call orchestration over the
//! remote API. It keeps no local git object model; its only local state
//! is an advisory blob cache keyed by content identifier.
//!
//! ## Example
//!
//! ```ignore
//! use quarry_core::{ContentBackend, Credential};
//! use quarry_gitlab::{GitLabBackend, GitLabConfig};
//!
//! let config = GitLabConfig::builder()
//!     .repo("group/project")
//!     .branch("main")
//!     .build()?;
//!
//! let backend = GitLabBackend::new(config)?;
//! backend.authenticate(Credential::new(token)).await?;
//!
//! let (entries, cursor) = backend.entries_by_folder("posts", "md").await?;
//! ```

pub mod access;
pub mod api;
pub mod backend;
pub mod cache;
pub mod commit;
pub mod config;
pub mod media;

// Re-exports
pub use access::{WRITE_ACCESS, has_write_access};
pub use api::{ApiClient, PROVIDER};
pub use backend::GitLabBackend;
pub use cache::BlobCache;
pub use commit::build_commit;
pub use config::{GitLabConfig, GitLabConfigBuilder, PublishMode};
pub use media::GitLabMediaBlob;

// Re-export quarry_core for consumers
pub use quarry_core;
