//! Command and outcome types for editor dispatch.

use quire_search::SearchRequest;

/// Commands an editor session understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // === Find / replace ===
    /// Find the next occurrence.
    /// Response: `Outcome::Found(bool)`
    Find(SearchRequest),

    /// Replace the current match.
    /// Response: `Outcome::Replaced(0 | 1)`
    Replace {
        replacement: String,
        /// Expand `\0`..`\9` from the match
        regex: bool,
    },

    /// Replace the current match, then find the next one.
    /// Response: `Outcome::Found(bool)`
    ReplaceAndFind,

    /// Replace every occurrence in the document or selection.
    /// Response: `Outcome::Replaced(count)`
    ReplaceAll(SearchRequest),

    /// Forget the search session.
    /// Response: `Outcome::Nothing`
    ResetSearch,

    // === Incremental search ===
    /// Search for the term typed so far.
    /// Response: `Outcome::Found(bool)`
    IncrementalSearch(String),

    /// Leave incremental search, restoring the selection.
    /// Response: `Outcome::Moved`
    IncrementalSearchCancel,

    /// Leave incremental search at the current match.
    /// Response: `Outcome::Nothing`
    IncrementalSearchCommit(String),

    // === Bookmarks ===
    /// Toggle the bookmark on a line (0-based), or on the caret line.
    /// Response: `Outcome::BookmarkToggled(added)`
    ToggleBookmark(Option<usize>),

    /// Response: `Outcome::Moved`, or `Outcome::Nothing` without bookmarks
    NextBookmark,

    /// Response: `Outcome::Moved`, or `Outcome::Nothing` without bookmarks
    PreviousBookmark,

    /// Response: `Outcome::Nothing`
    ClearBookmarks,

    // === Navigation and editing ===
    /// Put the caret at the start of a line (1-based, clamped).
    /// Response: `Outcome::Moved`
    GoToLine(usize),

    /// Response: `Outcome::Moved`, or `Outcome::Nothing` if nothing to undo
    Undo,

    /// Response: `Outcome::Moved`, or `Outcome::Nothing` if nothing to redo
    Redo,

    /// Apply the save hooks (trailing whitespace, final newline).
    /// Response: `Outcome::Nothing`
    PrepareSave,
}

/// Result of dispatching a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Command had nothing to report.
    #[default]
    Nothing,

    /// Whether a search found a match.
    Found(bool),

    /// Number of replacements made.
    Replaced(usize),

    /// Whether a bookmark was added (`false`: removed).
    BookmarkToggled(bool),

    /// The caret moved.
    Moved,
}

impl Outcome {
    /// Informational message for the user, if the outcome calls for one.
    pub fn notice(&self) -> Option<String> {
        match self {
            Outcome::Found(false) => Some("No results found".to_string()),
            Outcome::Replaced(0) => Some("No occurrences found".to_string()),
            Outcome::Replaced(1) => Some("Replaced 1 occurrence".to_string()),
            Outcome::Replaced(count) => Some(format!("Replaced {} occurrences", count)),
            _ => None,
        }
    }
}
