//! Pagination cursor for resumable listings.
//!
//! A cursor is a pure return value: every listing call returns
//! `(items, cursor)` explicitly, and traversal consumes the cursor it was
//! given. The request layer never mutates caller state to report position.

use std::collections::BTreeMap;

/// The follow-up action a cursor can record.
pub const ACTION_NEXT: &str = "next";

/// A resumable position within a paginated listing.
///
/// The cursor carries the folder it was produced for, so a traversal can
/// never accidentally continue listing a different folder. A cursor with
/// no recorded actions is terminal: [`Cursor::has_next`] returns false
/// without any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    folder: String,
    actions: BTreeMap<String, String>,
}

impl Cursor {
    /// Creates a terminal cursor for the given folder.
    pub fn done(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            actions: BTreeMap::new(),
        }
    }

    /// Creates a cursor with a recorded `next` action.
    pub fn with_next(folder: impl Into<String>, page_token: impl Into<String>) -> Self {
        let mut actions = BTreeMap::new();
        actions.insert(ACTION_NEXT.to_string(), page_token.into());
        Self {
            folder: folder.into(),
            actions,
        }
    }

    /// Builds a cursor from an optional next-page token, as returned by
    /// the request layer. An absent or empty token yields a terminal cursor.
    pub fn from_page_token(folder: impl Into<String>, token: Option<String>) -> Self {
        match token {
            Some(t) if !t.is_empty() => Self::with_next(folder, t),
            _ => Self::done(folder),
        }
    }

    /// Returns the folder this cursor belongs to.
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Returns true if more data may exist beyond this cursor.
    pub fn has_next(&self) -> bool {
        self.actions.contains_key(ACTION_NEXT)
    }

    /// Returns the next-page token, if any.
    pub fn next_page(&self) -> Option<&str> {
        self.actions.get(ACTION_NEXT).map(String::as_str)
    }

    /// Returns the available follow-up actions.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}
