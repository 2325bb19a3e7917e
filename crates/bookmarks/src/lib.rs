//! Line bookmarks for quire.
//!
//! Bookmarks live in the surface's marker bitmap under
//! [`BOOKMARK_MARKER`]; nothing is cached here, every query reads the
//! markers again.

use quire_surface::TextSurface;

/// Marker number used for bookmarks.
pub const BOOKMARK_MARKER: u32 = 0;

const BOOKMARK_MASK: u32 = 1 << BOOKMARK_MARKER;

/// Toggle/next/previous bookmark commands over a [`TextSurface`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BookmarkTracker;

impl BookmarkTracker {
    pub fn new() -> Self {
        Self
    }

    /// Flip the bookmark on `line`, or on the caret line when `None`.
    ///
    /// Returns `true` if the bookmark was added, `false` if removed.
    pub fn toggle<S: TextSurface + ?Sized>(&self, surface: &mut S, line: Option<usize>) -> bool {
        let line = line.unwrap_or_else(|| surface.caret_line());
        if line >= surface.line_count() {
            quire_logger::debug(format!("No line {} to bookmark", line + 1));
            return false;
        }
        if surface.marker_get(line) & BOOKMARK_MASK != 0 {
            surface.marker_delete(line, BOOKMARK_MARKER);
            quire_logger::debug(format!("Bookmark removed from line {}", line + 1));
            false
        } else {
            surface.marker_add(line, BOOKMARK_MARKER);
            quire_logger::debug(format!("Bookmark added on line {}", line + 1));
            true
        }
    }

    /// Move the caret to the next bookmarked line, wrapping to the first.
    ///
    /// Returns the line moved to; without bookmarks nothing happens.
    pub fn next<S: TextSurface + ?Sized>(&self, surface: &mut S) -> Option<usize> {
        let from = surface.caret_line();
        let line = surface
            .marker_next(from + 1, BOOKMARK_MASK)
            .or_else(|| surface.marker_next(0, BOOKMARK_MASK))?;
        Self::go_to(surface, line);
        Some(line)
    }

    /// Move the caret to the previous bookmarked line, wrapping to the last.
    pub fn previous<S: TextSurface + ?Sized>(&self, surface: &mut S) -> Option<usize> {
        let from = surface.caret_line();
        let last = surface.line_count().saturating_sub(1);
        let line = from
            .checked_sub(1)
            .and_then(|before| surface.marker_previous(before, BOOKMARK_MASK))
            .or_else(|| surface.marker_previous(last, BOOKMARK_MASK))?;
        Self::go_to(surface, line);
        Some(line)
    }

    /// Bookmarked lines, ascending.
    pub fn bookmarks<S: TextSurface + ?Sized>(&self, surface: &S) -> Vec<usize> {
        let mut lines = Vec::new();
        let mut from = 0;
        while let Some(line) = surface.marker_next(from, BOOKMARK_MASK) {
            lines.push(line);
            from = line + 1;
        }
        lines
    }

    /// Remove every bookmark.
    pub fn clear<S: TextSurface + ?Sized>(&self, surface: &mut S) {
        surface.marker_delete_all(BOOKMARK_MARKER);
    }

    fn go_to<S: TextSurface + ?Sized>(surface: &mut S, line: usize) {
        let pos = surface.position_from_line(line);
        surface.set_selection(pos, pos);
        surface.scroll_range(pos, pos);
    }
}
