//! # Quarry Core
//!
//! Provider-agnostic domain model and contract for Quarry's git-hosted
//! content storage. A content-management data model (collections of text
//! and media entries) is mapped onto git primitives through a hosting
//! provider's REST API; this crate defines what every provider module
//! must implement and the types they exchange.
//!
//! ## Example
//!
//! ```ignore
//! use quarry_core::{ContentBackend, Credential};
//!
//! let backend = make_backend_from_config()?;
//! let user = backend.authenticate(Credential::new(token)).await?;
//! let (entries, cursor) = backend.entries_by_folder("posts", "md").await?;
//! ```

pub mod backend;
pub mod cursor;
pub mod error;
pub mod fetcher;
pub mod types;

// Re-exports
pub use backend::{ContentBackend, Credential, MediaBlob, MediaFile};
pub use cursor::Cursor;
pub use error::{BackendError, Result};
pub use fetcher::{MAX_CONCURRENT_DOWNLOADS, fetch_all};
pub use types::{
    ContentIntent, FileContent, FileDescriptor, Payload, PersistOptions, PersistedFile, User,
    WriteRequest,
};
