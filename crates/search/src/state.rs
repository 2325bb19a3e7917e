//! Search session bookkeeping.

use quire_surface::Range;

use crate::SearchRequest;

/// State carried between Find calls on one document.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// Request of the previous Find
    pub last_request: Option<SearchRequest>,
    /// Last match as applied to the selection (anchor, caret), `None` if
    /// there is none or it was consumed by a replace
    pub last_result: Option<Range>,
    /// Range the current search session may look in; `start > end` for
    /// backwards sessions
    pub search_target: Range,
    pub is_new_search: bool,
    /// Caret left by the last Replace; a Find from there continues the
    /// session instead of starting over
    pub replaced_at: Option<usize>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            last_request: None,
            last_result: None,
            search_target: Range::default(),
            is_new_search: true,
            replaced_at: None,
        }
    }
}

impl SearchState {
    /// Forget the session; the next Find starts over.
    pub fn reset(&mut self) {
        self.last_result = None;
        self.replaced_at = None;
        self.is_new_search = true;
    }

    /// Check whether `selection` is where the session left the surface.
    pub fn is_continued_by(&self, selection: Range) -> bool {
        if self.last_result == Some(selection) {
            return true;
        }
        selection.is_empty() && self.replaced_at == Some(selection.end)
    }

    /// Account for a replacement of `removed` chars by `inserted` chars
    /// inside the target.
    pub fn shift_target(&mut self, removed: usize, inserted: usize) {
        let far = self.search_target.max() + inserted;
        let far = far.saturating_sub(removed);
        if self.search_target.is_backwards() {
            self.search_target.start = far;
        } else {
            self.search_target.end = far;
        }
    }
}
