//! Commit builder: turns write requests into one provider commit.
//!
//! Payloads are base64-encoded (text UTF-8 then base64, binary direct),
//! leading path separators stripped, and each action tagged `create` or
//! `update` from the caller's explicit intent. The builder never probes
//! the remote for existence.

use std::collections::HashSet;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use quarry_core::{BackendError, Payload, PersistOptions, Result, WriteRequest};

use crate::api::{CommitAction, CommitRequest};

/// Builds a single commit from one or more write requests.
///
/// Two requests targeting the same path are rejected: the provider would
/// apply them in order with last-wins semantics, which is never what a
/// caller means.
pub fn build_commit(
    requests: &[WriteRequest],
    options: &PersistOptions,
    default_branch: &str,
) -> Result<CommitRequest> {
    let mut seen = HashSet::new();
    let mut actions = Vec::with_capacity(requests.len());

    for request in requests {
        if !seen.insert(request.path()) {
            return Err(BackendError::DuplicatePath(request.path().to_string()));
        }

        actions.push(CommitAction {
            action: if options.new_entry { "create" } else { "update" },
            file_path: request.path().to_string(),
            content: encode_payload(request.payload()),
            encoding: "base64",
        });
    }

    Ok(CommitRequest {
        branch: options
            .branch
            .clone()
            .unwrap_or_else(|| default_branch.to_string()),
        commit_message: options.commit_message.clone(),
        actions,
    })
}

fn encode_payload(payload: &Payload) -> String {
    STANDARD.encode(payload.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_payload_is_base64() {
        let requests = vec![WriteRequest::text("posts/a.md", "hello")];
        let commit = build_commit(&requests, &PersistOptions::create("add"), "master").unwrap();

        assert_eq!(commit.actions.len(), 1);
        assert_eq!(commit.actions[0].content, "aGVsbG8=");
        assert_eq!(commit.actions[0].encoding, "base64");
    }

    #[test]
    fn test_binary_payload_is_encoded_directly() {
        let requests = vec![WriteRequest::binary("media/logo.png", vec![0x89, 0x50, 0x4e])];
        let commit = build_commit(&requests, &PersistOptions::create("add"), "master").unwrap();

        assert_eq!(commit.actions[0].content, STANDARD.encode([0x89, 0x50, 0x4e]));
    }

    #[test]
    fn test_create_vs_update_follows_caller_intent() {
        let requests = vec![WriteRequest::text("posts/a.md", "x")];

        let commit = build_commit(&requests, &PersistOptions::create("add"), "master").unwrap();
        assert_eq!(commit.actions[0].action, "create");

        let commit = build_commit(&requests, &PersistOptions::update("edit"), "master").unwrap();
        assert_eq!(commit.actions[0].action, "update");
    }

    #[test]
    fn test_leading_slash_stripped() {
        let requests = vec![WriteRequest::text("/posts/a.md", "x")];
        let commit = build_commit(&requests, &PersistOptions::create("add"), "master").unwrap();
        assert_eq!(commit.actions[0].file_path, "posts/a.md");
    }

    #[test]
    fn test_branch_selection() {
        let requests = vec![WriteRequest::text("posts/a.md", "x")];

        let commit = build_commit(&requests, &PersistOptions::create("add"), "master").unwrap();
        assert_eq!(commit.branch, "master");

        let options = PersistOptions::create("add").on_branch("staging");
        let commit = build_commit(&requests, &options, "master").unwrap();
        assert_eq!(commit.branch, "staging");
    }

    #[test]
    fn test_multiple_requests_bundle_into_one_commit() {
        let requests = vec![
            WriteRequest::text("posts/a.md", "a"),
            WriteRequest::text("posts/b.md", "b"),
        ];
        let commit = build_commit(&requests, &PersistOptions::create("add"), "master").unwrap();

        assert_eq!(commit.actions.len(), 2);
        // Actions keep the order given.
        assert_eq!(commit.actions[0].file_path, "posts/a.md");
        assert_eq!(commit.actions[1].file_path, "posts/b.md");
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let requests = vec![
            WriteRequest::text("posts/a.md", "first"),
            WriteRequest::text("posts/a.md", "second"),
        ];
        let result = build_commit(&requests, &PersistOptions::create("add"), "master");

        match result {
            Err(BackendError::DuplicatePath(path)) => assert_eq!(path, "posts/a.md"),
            other => panic!("expected duplicate path error, got {other:?}"),
        }
    }
}
