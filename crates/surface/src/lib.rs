//! Text surface for quire.
//!
//! A position-addressed, marker-capable text buffer. Everything that
//! drives the document (search coordination, bookmarks, the editor
//! session) talks to it through the [`TextSurface`] trait, and
//! [`RopeSurface`] is the rope-backed implementation.

mod guard;
mod history;
mod markers;
mod rope;
mod viewport;

pub use guard::{selection_guard, Restore, SelectionGuard, UndoGroup};
pub use history::{Action, History};
pub use markers::MarkerTable;
pub use rope::RopeSurface;
pub use viewport::Viewport;

/// Line ending type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::upper_case_acronyms)]
pub enum LineEnding {
    #[default]
    LF, // Unix \n
    CRLF, // Windows \r\n
}

/// A pair of character offsets into the document.
///
/// `start` may exceed `end`, which expresses a backwards range: a search
/// over such a range runs from `start` down to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    /// Create a range from `start` to `end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smaller endpoint.
    pub fn min(&self) -> usize {
        self.start.min(self.end)
    }

    /// Larger endpoint.
    pub fn max(&self) -> usize {
        self.start.max(self.end)
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.max() - self.min()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_backwards(&self) -> bool {
        self.start > self.end
    }

    /// Same endpoints, opposite direction.
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    /// Same endpoints in ascending order.
    pub fn normalized(&self) -> Self {
        Self::new(self.min(), self.max())
    }
}

/// Search options understood by [`TextSurface::search_in_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SearchFlags {
    /// Case-sensitive search.
    pub match_case: bool,
    /// Whole word only.
    pub whole_word: bool,
    /// Treat the pattern as a regular expression.
    pub regex: bool,
}

/// Editable text addressed by zero-based character offsets.
///
/// The surface owns the document, the selection (anchor and caret), the
/// undo history and a per-line marker bitmap. It knows nothing about
/// search sessions; callers keep that state themselves.
pub trait TextSurface {
    /// Document length in characters.
    fn length(&self) -> usize;

    /// Text between two offsets, in either order.
    fn text_range(&self, start: usize, end: usize) -> String;

    /// Number of lines. An empty document has one line.
    fn line_count(&self) -> usize;

    /// Line containing `pos`.
    fn line_from_position(&self, pos: usize) -> usize;

    /// Offset of the first character of `line`.
    fn position_from_line(&self, line: usize) -> usize;

    /// Offset just before the line break of `line`.
    fn line_end_position(&self, line: usize) -> usize;

    fn anchor(&self) -> usize;

    fn caret(&self) -> usize;

    /// Set both ends of the selection. Offsets are clamped to the document.
    fn set_selection(&mut self, anchor: usize, caret: usize);

    /// Find `pattern` between `start` and `end`.
    ///
    /// When `start > end` the search runs backwards and yields the match
    /// closest to `start`. Matches never extend outside the range.
    /// Malformed regular expressions yield `None`.
    fn search_in_range(
        &mut self,
        pattern: &str,
        start: usize,
        end: usize,
        flags: SearchFlags,
    ) -> Option<Range>;

    /// Replace `range` with `text` and return the offset just past the
    /// inserted text. With `regex` set, `\0`..`\9` expand to the capture
    /// groups of the last successful regular expression search.
    fn replace_range(&mut self, range: Range, text: &str, regex: bool) -> usize;

    /// Open an undo group. Groups nest; only the outermost pair counts.
    fn begin_undo_group(&mut self);

    fn end_undo_group(&mut self);

    /// Undo the last action or group, returning the new caret.
    fn undo(&mut self) -> Option<usize>;

    /// Redo the last undone action or group, returning the new caret.
    fn redo(&mut self) -> Option<usize>;

    /// Bring the range between `anchor` and `caret` into view.
    fn scroll_range(&mut self, anchor: usize, caret: usize);

    /// Marker bitmask of `line`.
    fn marker_get(&self, line: usize) -> u32;

    /// Set marker number `marker` on `line`.
    fn marker_add(&mut self, line: usize, marker: u32);

    /// Clear marker number `marker` on `line`.
    fn marker_delete(&mut self, line: usize, marker: u32);

    /// Clear marker number `marker` on every line.
    fn marker_delete_all(&mut self, marker: u32);

    /// First line at or after `from_line` whose bitmask intersects `mask`.
    fn marker_next(&self, from_line: usize, mask: u32) -> Option<usize>;

    /// Last line at or before `from_line` whose bitmask intersects `mask`.
    fn marker_previous(&self, from_line: usize, mask: u32) -> Option<usize>;

    /// Current selection as (anchor, caret).
    fn selection(&self) -> Range {
        Range::new(self.anchor(), self.caret())
    }

    /// Whole document text.
    fn text(&self) -> String {
        self.text_range(0, self.length())
    }

    /// Line containing the caret.
    fn caret_line(&self) -> usize {
        self.line_from_position(self.caret())
    }
}
