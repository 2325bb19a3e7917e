//! Find / Replace / ReplaceAll coordination.

use quire_surface::{Range, TextSurface, UndoGroup};

use crate::{SearchRequest, SearchState};

/// Turns find and replace requests into bounded searches on a
/// [`TextSurface`] and keeps the session between calls.
///
/// One coordinator per open document. Outcomes are plain values: a search
/// that finds nothing returns `false` and leaves the selection alone.
#[derive(Debug, Default)]
pub struct SearchCoordinator {
    pub(crate) state: SearchState,
    /// Selection to fall back to while an incremental search is running
    pub(crate) saved_selection: Option<Range>,
}

impl SearchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Request of the previous Find (or committed incremental search)
    pub fn last_request(&self) -> Option<&SearchRequest> {
        self.state.last_request.as_ref()
    }

    /// Check whether a Replace would act
    pub fn has_match(&self) -> bool {
        self.state.last_result.is_some()
    }

    /// Make the next Find start a new search
    pub fn reset_search(&mut self) {
        self.state.reset();
    }

    /// Find the next occurrence of `request.pattern`.
    ///
    /// Repeating the same request while the selection still holds the
    /// previous match resumes after it. Anything else starts a new search
    /// from the caret (or the anchor, backwards), or over the selection
    /// with `in_selection`. A match is selected with the caret at the end
    /// the search moved towards.
    pub fn find<S: TextSurface + ?Sized>(&mut self, surface: &mut S, request: &SearchRequest) -> bool {
        let selection = surface.selection();
        if self.state.last_request.as_ref() != Some(request)
            || !self.state.is_continued_by(selection)
        {
            self.state.is_new_search = true;
        }

        let len = surface.length();
        if self.state.is_new_search {
            self.state.search_target = if request.in_selection {
                let span = selection.normalized();
                if request.backwards {
                    span.reversed()
                } else {
                    span
                }
            } else if request.backwards {
                Range::new(selection.start, 0)
            } else {
                Range::new(selection.end, len)
            };
        }
        let target = self.state.search_target;

        let resume = if self.state.is_new_search {
            Some(target.start)
        } else {
            let caret = surface.caret();
            // Step over an empty match, or it would be found again
            let after_empty = self.state.last_result.is_some_and(|r| r.is_empty());
            match (after_empty, request.backwards) {
                (false, _) => Some(caret),
                (true, false) => Some(caret + 1).filter(|&p| p <= target.end),
                (true, true) => caret.checked_sub(1).filter(|&p| p >= target.end),
            }
        };

        let flags = request.flags();
        let mut found =
            resume.and_then(|from| surface.search_in_range(&request.pattern, from, target.end, flags));

        if found.is_none() && request.wrap_around {
            let restart = match (request.in_selection, request.backwards) {
                (true, _) => target.start,
                (false, false) => 0,
                (false, true) => len,
            };
            let until = resume.unwrap_or(target.end);
            if restart != until {
                quire_logger::debug(format!("Find {:?}: wrapping around", request.pattern));
                found = surface.search_in_range(&request.pattern, restart, until, flags);
            }
        }

        self.state.last_request = Some(request.clone());
        self.state.is_new_search = false;

        let Some(found) = found else {
            quire_logger::debug(format!("Find {:?}: no match", request.pattern));
            self.state.last_result = None;
            return false;
        };

        let applied = if request.backwards {
            found.normalized().reversed()
        } else {
            found.normalized()
        };
        surface.set_selection(applied.start, applied.end);
        surface.scroll_range(applied.start, applied.end);
        self.state.last_result = Some(applied);
        self.state.replaced_at = None;
        true
    }

    /// Replace the current match with `replacement`.
    ///
    /// Does nothing unless the last Find succeeded and its match is still
    /// selected. Consumes the match, so a second Replace without a Find in
    /// between is a no-op. The caret ends up past the new text (before it,
    /// for backwards searches) and undo reverts the replacement in one step.
    pub fn replace<S: TextSurface + ?Sized>(&mut self, surface: &mut S, replacement: &str, regex: bool) -> bool {
        let (Some(last), Some(request)) = (self.state.last_result.take(), self.state.last_request.clone())
        else {
            quire_logger::debug("Replace: no current match");
            return false;
        };

        if surface.selection() != last {
            quire_logger::debug("Replace: selection moved since the last find");
            self.state.reset();
            return false;
        }

        let span = last.normalized();

        // Search the match again so capture groups belong to it
        let again = surface.search_in_range(&request.pattern, span.start, span.end, request.flags());
        if again != Some(span) {
            quire_logger::debug("Replace: the match is gone");
            self.state.reset();
            return false;
        }

        let mut surface = UndoGroup::new(surface);
        let end = surface.replace_range(span, replacement, regex);

        let caret = if request.backwards { span.start } else { end };
        surface.set_selection(caret, caret);
        surface.scroll_range(caret, caret);

        self.state.shift_target(span.len(), end - span.start);
        self.state.replaced_at = Some(caret);
        true
    }

    /// Replace the current match with the last request's replacement, then
    /// find the next occurrence.
    pub fn replace_and_find<S: TextSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let Some(request) = self.state.last_request.clone() else {
            return false;
        };
        self.replace(surface, &request.replacement, request.regex);
        self.find(surface, &request)
    }

    /// Replace every occurrence in the document, or in the selection with
    /// `in_selection`, and return how many were replaced.
    ///
    /// Always one forward sweep; `backwards` and `wrap_around` are ignored.
    /// Scanning resumes after each inserted replacement, so a replacement
    /// containing the pattern is never matched again. The whole sweep is a
    /// single undo step. With `in_selection` the selection afterwards spans
    /// the edited scope.
    pub fn replace_all<S: TextSurface + ?Sized>(&mut self, surface: &mut S, request: &SearchRequest) -> usize {
        self.state.reset();
        if request.pattern.is_empty() {
            return 0;
        }

        let (scope_start, mut scope_end) = if request.in_selection {
            let span = surface.selection().normalized();
            (span.start, span.end)
        } else {
            (0, surface.length())
        };

        let flags = request.flags();
        let mut surface = UndoGroup::new(surface);
        let mut count = 0;
        let mut cursor = scope_start;

        while cursor <= scope_end {
            let Some(found) = surface.search_in_range(&request.pattern, cursor, scope_end, flags) else {
                break;
            };
            let end = surface.replace_range(found, &request.replacement, request.regex);
            scope_end = scope_end - found.len() + (end - found.start);
            count += 1;

            cursor = if found.is_empty() { end + 1 } else { end };
        }

        if request.in_selection {
            surface.set_selection(scope_start, scope_end);
            surface.scroll_range(scope_start, scope_end);
        }

        quire_logger::debug(format!("Replace all {:?}: {} occurrences", request.pattern, count));
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_surface::RopeSurface;

    fn forward(pattern: &str) -> SearchRequest {
        SearchRequest::new(pattern)
    }

    fn backward(pattern: &str) -> SearchRequest {
        SearchRequest {
            backwards: true,
            ..SearchRequest::new(pattern)
        }
    }

    fn wrapping(request: SearchRequest) -> SearchRequest {
        SearchRequest {
            wrap_around: true,
            ..request
        }
    }

    /// "Lorem ipsum ..." with "ipsum" at 6, 113 and 365
    fn lorem() -> String {
        fn pad_to(text: &mut String, len: usize) {
            let filler = " consectetur adipiscing elit sed do eiusmod tempor";
            let mut chars = filler.chars().cycle();
            while text.len() < len {
                text.extend(chars.next());
            }
        }

        let mut text = String::from("Lorem ipsum dolor sit amet,");
        pad_to(&mut text, 113);
        text.push_str("ipsum urna");
        pad_to(&mut text, 365);
        text.push_str("ipsum.");
        text
    }

    #[test]
    fn test_forward_find_selects_anchor_to_caret() {
        let mut surface = RopeSurface::from_text("one two one");
        let mut search = SearchCoordinator::new();

        assert!(search.find(&mut surface, &forward("two")));
        assert_eq!(surface.anchor(), 4);
        assert_eq!(surface.caret(), 7);
        assert!(search.has_match());
    }

    #[test]
    fn test_backward_find_puts_caret_at_match_start() {
        let mut surface = RopeSurface::from_text("ab ab");
        surface.set_selection(5, 5);
        let mut search = SearchCoordinator::new();

        assert!(search.find(&mut surface, &backward("ab")));
        assert_eq!((surface.anchor(), surface.caret()), (5, 3));

        assert!(search.find(&mut surface, &backward("ab")));
        assert_eq!((surface.anchor(), surface.caret()), (2, 0));

        assert!(!search.find(&mut surface, &backward("ab")));
    }

    #[test]
    fn test_repeated_find_moves_to_next_occurrence() {
        let mut surface = RopeSurface::from_text("cat cat cat");
        let mut search = SearchCoordinator::new();

        assert!(search.find(&mut surface, &forward("cat")));
        let first = surface.selection();
        assert!(search.find(&mut surface, &forward("cat")));
        let second = surface.selection();

        assert_eq!(first, Range::new(0, 3));
        assert_eq!(second, Range::new(4, 7));
    }

    #[test]
    fn test_failed_find_keeps_selection() {
        let mut surface = RopeSurface::from_text("hello world");
        surface.set_selection(2, 4);
        let mut search = SearchCoordinator::new();

        assert!(!search.find(&mut surface, &forward("planet")));
        assert_eq!(surface.selection(), Range::new(2, 4));

        assert!(!search.find(&mut surface, &forward("")));
        assert_eq!(surface.selection(), Range::new(2, 4));
    }

    #[test]
    fn test_replace_after_failed_find_does_nothing() {
        let mut surface = RopeSurface::from_text("foo baz");
        let mut search = SearchCoordinator::new();

        assert!(search.find(&mut surface, &forward("foo")));
        assert!(!search.find(&mut surface, &forward("bar")));
        assert!(!search.has_match());
        assert!(!search.replace(&mut surface, "X", false));
        assert_eq!(surface.text(), "foo baz");
    }

    #[test]
    fn test_replace_requires_match_to_still_be_there() {
        let mut surface = RopeSurface::from_text("foo baz");
        let mut search = SearchCoordinator::new();

        assert!(search.find(&mut surface, &forward("foo")));
        surface.replace_range(Range::new(0, 3), "bar", false);
        surface.set_selection(0, 3);

        assert!(!search.replace(&mut surface, "X", false));
        assert_eq!(surface.text(), "bar baz");
    }

    #[test]
    fn test_wrap_around() {
        let mut surface = RopeSurface::from_text("ab ab ab");
        surface.set_selection(7, 7);
        let mut search = SearchCoordinator::new();

        assert!(!search.find(&mut surface, &forward("ab")));
        assert!(search.find(&mut surface, &wrapping(forward("ab"))));
        assert_eq!(surface.selection(), Range::new(0, 2));

        surface.set_selection(0, 0);
        assert!(search.find(&mut surface, &wrapping(backward("ab"))));
        assert_eq!(surface.selection(), Range::new(8, 6));
    }

    #[test]
    fn test_single_occurrence_wraps_onto_itself() {
        let mut surface = RopeSurface::from_text("only one needle here");
        let mut search = SearchCoordinator::new();
        let request = wrapping(forward("needle"));

        assert!(search.find(&mut surface, &request));
        assert!(search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(9, 15));
    }

    #[test]
    fn test_lorem_scenario() {
        let text = lorem();
        let mut surface = RopeSurface::from_text(&text);
        let mut search = SearchCoordinator::new();
        let request = forward("ipsum");

        assert!(search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(6, 11));
        assert!(search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(113, 118));
        assert!(search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(365, 370));

        // Past the last occurrence
        assert!(!search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(365, 370));

        assert!(search.find(&mut surface, &wrapping(request)));
        assert_eq!(surface.selection(), Range::new(6, 11));
    }

    #[test]
    fn test_moved_selection_starts_new_search() {
        let mut surface = RopeSurface::from_text("ab ab ab");
        let mut search = SearchCoordinator::new();

        assert!(search.find(&mut surface, &forward("ab")));
        surface.set_selection(4, 4);
        assert!(search.find(&mut surface, &forward("ab")));
        assert_eq!(surface.selection(), Range::new(6, 8));
    }

    #[test]
    fn test_reset_search_restarts_from_caret() {
        let mut surface = RopeSurface::from_text("ab ab ab");
        let mut search = SearchCoordinator::new();
        let request = SearchRequest {
            in_selection: true,
            ..forward("ab")
        };

        surface.set_selection(0, 5);
        assert!(search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(0, 2));

        search.reset_search();
        assert!(!search.has_match());
        // The new target is the selection (0, 2) itself
        assert!(search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(0, 2));
    }

    #[test]
    fn test_find_in_selection_stays_inside() {
        let mut surface = RopeSurface::from_text("x x x x");
        surface.set_selection(2, 5);
        let mut search = SearchCoordinator::new();
        let request = SearchRequest {
            in_selection: true,
            ..forward("x")
        };

        assert!(search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(2, 3));
        assert!(search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(4, 5));
        assert!(!search.find(&mut surface, &request));

        let request = wrapping(request);
        surface.set_selection(2, 5);
        assert!(search.find(&mut surface, &request));
        assert!(search.find(&mut surface, &request));
        // Wraps to the selection start, not the document start
        assert!(search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(2, 3));
    }

    #[test]
    fn test_case_and_whole_word_requests() {
        let mut surface = RopeSurface::from_text("Span spanner span");
        let mut search = SearchCoordinator::new();
        let request = SearchRequest {
            match_case: true,
            match_word: true,
            ..forward("span")
        };

        assert!(search.find(&mut surface, &request));
        assert_eq!(surface.selection(), Range::new(13, 17));
    }

    #[test]
    fn test_replace_does_not_refind_inserted_text() {
        let mut surface = RopeSurface::from_text("a span b");
        let mut search = SearchCoordinator::new();

        assert!(search.find(&mut surface, &forward("span")));
        assert!(search.replace(&mut surface, "span class", false));
        assert_eq!(surface.text(), "a span class b");
        assert_eq!(surface.caret(), 12);

        assert!(!search.find(&mut surface, &forward("span")));
    }

    #[test]
    fn test_replace_consumes_the_match() {
        let mut surface = RopeSurface::from_text("foo foo");
        let mut search = SearchCoordinator::new();

        assert!(!search.replace(&mut surface, "bar", false));

        assert!(search.find(&mut surface, &forward("foo")));
        assert!(search.replace(&mut surface, "bar", false));
        assert!(!search.has_match());
        assert!(!search.replace(&mut surface, "baz", false));
        assert_eq!(surface.text(), "bar foo");

        surface.undo();
        assert_eq!(surface.text(), "foo foo");
    }

    #[test]
    fn test_replace_after_selection_moved_is_noop() {
        let mut surface = RopeSurface::from_text("foo foo");
        let mut search = SearchCoordinator::new();

        assert!(search.find(&mut surface, &forward("foo")));
        surface.set_selection(5, 5);
        assert!(!search.replace(&mut surface, "bar", false));
        assert_eq!(surface.text(), "foo foo");
    }

    #[test]
    fn test_replace_and_find() {
        let mut surface = RopeSurface::from_text("span span");
        let mut search = SearchCoordinator::new();
        let request = forward("span").with_replacement("span class");

        assert!(search.find(&mut surface, &request));
        assert!(search.replace_and_find(&mut surface));
        assert_eq!(surface.text(), "span class span");
        assert_eq!(surface.selection(), Range::new(11, 15));

        assert!(!search.replace_and_find(&mut surface));
        assert_eq!(surface.text(), "span class span class");
    }

    #[test]
    fn test_backward_replace_and_find() {
        let mut surface = RopeSurface::from_text("one one one");
        surface.set_selection(11, 11);
        let mut search = SearchCoordinator::new();
        let request = backward("one").with_replacement("1");

        assert!(search.find(&mut surface, &request));
        assert!(search.replace_and_find(&mut surface));
        assert_eq!(surface.text(), "one one 1");
        assert_eq!(surface.selection(), Range::new(7, 4));
    }

    #[test]
    fn test_regex_replace_uses_groups_of_current_match() {
        let mut surface = RopeSurface::from_text("a=1 b=2");
        let mut search = SearchCoordinator::new();
        let request = SearchRequest {
            regex: true,
            ..forward(r"(\w)=(\d)")
        };

        assert!(search.find(&mut surface, &request));
        assert!(search.find(&mut surface, &request));
        assert!(search.replace(&mut surface, r"\2=\1", true));
        assert_eq!(surface.text(), "a=1 2=b");
    }

    #[test]
    fn test_replace_all_terminates_when_replacement_contains_pattern() {
        let mut surface = RopeSurface::from_text("ipsum ipsum\nipsum");
        let mut search = SearchCoordinator::new();
        let request = forward("ipsum").with_replacement("ipsum ipsum");

        assert_eq!(search.replace_all(&mut surface, &request), 3);
        assert_eq!(surface.text(), "ipsum ipsum ipsum ipsum\nipsum ipsum");
    }

    #[test]
    fn test_replace_all_in_selection() {
        let mut surface = RopeSurface::from_text("ipsum a ipsum b ipsum");
        surface.set_selection(3, 18);
        let mut search = SearchCoordinator::new();
        let request = SearchRequest {
            in_selection: true,
            ..forward("ipsum").with_replacement("X")
        };

        assert_eq!(search.replace_all(&mut surface, &request), 1);
        assert_eq!(surface.text(), "ipsum a X b ipsum");
        assert_eq!(surface.selection(), Range::new(3, 14));
    }

    #[test]
    fn test_replace_all_in_selection_cuts_greedy_match() {
        let mut surface = RopeSurface::from_text("xaaa yaaa");
        surface.set_selection(0, 3);
        let mut search = SearchCoordinator::new();
        let request = SearchRequest {
            in_selection: true,
            regex: true,
            ..forward("a+").with_replacement("b")
        };

        assert_eq!(search.replace_all(&mut surface, &request), 1);
        assert_eq!(surface.text(), "xba yaaa");
        assert_eq!(surface.selection(), Range::new(0, 2));
    }

    #[test]
    fn test_backward_find_takes_overlapping_match_nearest_caret() {
        let mut surface = RopeSurface::from_text("aaa");
        surface.set_selection(3, 3);
        let mut search = SearchCoordinator::new();

        assert!(search.find(&mut surface, &backward("aa")));
        assert_eq!(surface.selection(), Range::new(3, 1));
    }

    #[test]
    fn test_replace_all_is_one_undo_step() {
        let mut surface = RopeSurface::from_text("a-b-c-d");
        let mut search = SearchCoordinator::new();

        assert_eq!(search.replace_all(&mut surface, &forward("-").with_replacement("+")), 3);
        assert_eq!(surface.text(), "a+b+c+d");

        surface.undo();
        assert_eq!(surface.text(), "a-b-c-d");
    }

    #[test]
    fn test_replace_all_ignores_direction_and_empty_pattern() {
        let mut surface = RopeSurface::from_text("aaa");
        surface.set_selection(3, 3);
        let mut search = SearchCoordinator::new();

        let request = SearchRequest {
            backwards: true,
            wrap_around: true,
            ..forward("a").with_replacement("b")
        };
        assert_eq!(search.replace_all(&mut surface, &request), 3);
        assert_eq!(surface.text(), "bbb");

        assert_eq!(search.replace_all(&mut surface, &forward("")), 0);
        assert_eq!(search.replace_all(&mut surface, &forward("zzz")), 0);
    }

    #[test]
    fn test_replace_all_zero_width_regex() {
        let mut surface = RopeSurface::from_text("a\nb\nc");
        let mut search = SearchCoordinator::new();
        let request = SearchRequest {
            regex: true,
            ..forward("^").with_replacement("> ")
        };

        assert_eq!(search.replace_all(&mut surface, &request), 3);
        assert_eq!(surface.text(), "> a\n> b\n> c");
    }

    #[test]
    fn test_replace_all_regex_captures() {
        let mut surface = RopeSurface::from_text("me@home you@work");
        let mut search = SearchCoordinator::new();
        let request = SearchRequest {
            regex: true,
            ..forward(r"(\w+)@(\w+)").with_replacement(r"\2 at \1")
        };

        assert_eq!(search.replace_all(&mut surface, &request), 2);
        assert_eq!(surface.text(), "home at me work at you");
    }
}
