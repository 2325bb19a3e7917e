//! Incremental (type-ahead) search.

use quire_surface::{SearchFlags, SelectionGuard, TextSurface};

use crate::{SearchCoordinator, SearchRequest};

impl SearchCoordinator {
    /// Search for `term` as it is being typed.
    ///
    /// The first call remembers the selection. Each call looks for `term`
    /// case-insensitively from the start of the current selection and
    /// wraps to the document start. When `term` occurs nowhere the
    /// remembered selection comes back.
    pub fn incremental_search<S: TextSurface + ?Sized>(&mut self, surface: &mut S, term: &str) -> bool {
        let saved = *self.saved_selection.get_or_insert_with(|| surface.selection());
        let from = surface.anchor().min(surface.caret());
        let len = surface.length();

        let mut surface = SelectionGuard::with_selection(surface, saved);
        let flags = SearchFlags::default();
        let mut found = surface.search_in_range(term, from, len, flags);
        if found.is_none() && from > 0 {
            found = surface.search_in_range(term, 0, len, flags);
        }

        match found {
            Some(range) => {
                surface.set_selection(range.start, range.end);
                surface.scroll_range(range.start, range.end);
                surface.commit();
                true
            }
            None => {
                quire_logger::debug(format!("Incremental search {:?}: no match", term));
                false
            }
        }
    }

    /// Leave incremental search and put the original selection back.
    pub fn incremental_search_cancel<S: TextSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(saved) = self.saved_selection.take() {
            surface.set_selection(saved.start, saved.end);
            surface.scroll_range(saved.start, saved.end);
        }
    }

    /// Leave incremental search keeping the current match.
    ///
    /// The next Find for `term` (wrapping) picks up after it.
    pub fn incremental_search_commit(&mut self, term: &str) {
        self.saved_selection = None;
        self.state.reset();
        self.state.last_request = Some(SearchRequest {
            wrap_around: true,
            ..SearchRequest::new(term)
        });
    }

    /// Check whether an incremental search is running
    pub fn is_incremental(&self) -> bool {
        self.saved_selection.is_some()
    }
}
