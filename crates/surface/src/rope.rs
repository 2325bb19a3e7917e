use anyhow::{Context, Result};
use regex::{Captures, Regex, RegexBuilder};
use ropey::Rope;
use std::path::{Path, PathBuf};

use crate::{Action, History, LineEnding, MarkerTable, Range, SearchFlags, TextSurface, Viewport};

/// Text surface based on Rope for efficient work with large files
#[derive(Debug, Clone)]
pub struct RopeSurface {
    /// Rope structure for storing text (always `\n` line breaks)
    rope: Rope,
    /// File path (if exists)
    file_path: Option<PathBuf>,
    /// Modified flag
    modified: bool,
    /// Line ending type (for saving)
    line_ending: LineEnding,
    /// Edit history for undo/redo
    history: History,
    /// Fixed end of the selection
    anchor: usize,
    /// Active end of the selection
    caret: usize,
    /// Line markers (bookmarks and friends)
    markers: MarkerTable,
    viewport: Viewport,
    /// Capture groups of the last successful regex search
    captures: Vec<Option<String>>,
    /// Last compiled search pattern
    compiled: Option<CompiledPattern>,
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    pattern: String,
    flags: SearchFlags,
    regex: Regex,
}

impl RopeSurface {
    /// Create a new empty surface
    pub fn new() -> Self {
        Self::from_rope(Rope::new())
    }

    /// Create surface holding `text`
    pub fn from_text(text: &str) -> Self {
        Self::from_rope(Rope::from_str(&text.replace("\r\n", "\n")))
    }

    fn from_rope(rope: Rope) -> Self {
        Self {
            rope,
            file_path: None,
            modified: false,
            line_ending: LineEnding::LF,
            history: History::new(),
            anchor: 0,
            caret: 0,
            markers: MarkerTable::new(),
            viewport: Viewport::default(),
            captures: Vec::new(),
            compiled: None,
        }
    }

    /// Load file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        // Determine line ending type
        let line_ending = if contents.contains("\r\n") {
            LineEnding::CRLF
        } else {
            LineEnding::LF
        };

        let mut surface = Self::from_text(&contents);
        surface.file_path = Some(path.to_path_buf());
        surface.line_ending = line_ending;
        Ok(surface)
    }

    /// Save file
    pub fn save(&mut self) -> Result<()> {
        if let Some(path) = self.file_path.clone() {
            self.save_to(&path)
        } else {
            anyhow::bail!("No file path set")
        }
    }

    /// Save to specified file
    pub fn save_to<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.contents_for_disk())
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// Text with the file's own line endings
    pub fn contents_for_disk(&self) -> String {
        let text = self.rope.to_string();
        match self.line_ending {
            LineEnding::LF => text,
            LineEnding::CRLF => text.replace('\n', "\r\n"),
        }
    }

    /// Check if surface content differs from file on disk
    fn is_content_modified(&self) -> Result<bool> {
        let Some(path) = &self.file_path else {
            return Ok(self.modified);
        };

        match std::fs::read_to_string(path) {
            Ok(file_content) => Ok(self.contents_for_disk() != file_content),
            // Deleted, permissions, etc. - keep current flag
            Err(_) => Ok(self.modified),
        }
    }

    /// Get line by index (with its line break)
    pub fn line(&self, index: usize) -> Option<String> {
        if index < self.rope.len_lines() {
            Some(self.rope.line(index).to_string())
        } else {
            None
        }
    }

    /// Insert text at a character offset, returning the offset after it
    pub fn insert(&mut self, pos: usize, text: &str) -> usize {
        let pos = pos.min(self.rope.len_chars());
        if text.is_empty() {
            return pos;
        }
        let text = text.replace("\r\n", "\n");
        self.raw_insert(pos, &text);
        let end = pos + text.chars().count();
        self.history.push(Action::Insert {
            position: pos,
            text,
        });
        end
    }

    /// Delete text between two offsets, returning the removed text
    pub fn delete_range(&mut self, start: usize, end: usize) -> String {
        let len = self.rope.len_chars();
        let (start, end) = (start.min(end).min(len), start.max(end).min(len));
        if start == end {
            return String::new();
        }
        let text = self.rope.slice(start..end).to_string();
        self.raw_remove(start, end);
        self.history.push(Action::Delete {
            position: start,
            text: text.clone(),
        });
        text
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Limit undo steps. Clears the existing history.
    pub fn set_undo_limit(&mut self, limit: usize) {
        self.history = History::with_capacity(limit);
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn raw_insert(&mut self, pos: usize, text: &str) {
        let line = self.rope.char_to_line(pos);
        self.rope.insert(pos, text);
        self.markers
            .lines_inserted(line, text.matches('\n').count());

        let len = text.chars().count();
        let shift = |p: usize| if p > pos { p + len } else { p };
        self.anchor = shift(self.anchor);
        self.caret = shift(self.caret);
        self.modified = true;
    }

    fn raw_remove(&mut self, start: usize, end: usize) {
        let line = self.rope.char_to_line(start);
        let removed_lines = self.rope.slice(start..end).chars().filter(|&c| c == '\n').count();
        self.rope.remove(start..end);
        self.markers.lines_removed(line, removed_lines);

        let shift = |p: usize| {
            if p >= end {
                p - (end - start)
            } else {
                p.min(start)
            }
        };
        self.anchor = shift(self.anchor);
        self.caret = shift(self.caret);
        self.modified = true;
    }

    /// Apply action to surface (for undo/redo), returning the caret
    fn apply_action(&mut self, action: &Action) -> usize {
        match action {
            Action::Insert { position, text } => {
                self.raw_insert(*position, text);
                position + text.chars().count()
            }
            Action::Delete { position, text } => {
                let end = position + text.chars().count();
                self.raw_remove(*position, end);
                *position
            }
            Action::Group { actions } => actions
                .iter()
                .fold(self.caret, |_, action| self.apply_action(action)),
        }
    }

    fn after_history_step(&mut self, caret: usize) -> usize {
        self.set_selection(caret, caret);
        let modified = self.is_content_modified().unwrap_or(true);
        self.modified = modified;
        caret
    }

    fn compile(&mut self, pattern: &str, flags: SearchFlags) -> Option<Regex> {
        if let Some(compiled) = &self.compiled {
            if compiled.pattern == pattern && compiled.flags == flags {
                return Some(compiled.regex.clone());
            }
        }

        let source = if flags.regex {
            pattern.to_string()
        } else {
            regex::escape(pattern)
        };

        match RegexBuilder::new(&source)
            .case_insensitive(!flags.match_case)
            .multi_line(true)
            .build()
        {
            Ok(regex) => {
                self.compiled = Some(CompiledPattern {
                    pattern: pattern.to_string(),
                    flags,
                    regex: regex.clone(),
                });
                Some(regex)
            }
            Err(e) => {
                quire_logger::debug(format!("Invalid search pattern {:?}: {}", pattern, e));
                self.compiled = None;
                None
            }
        }
    }

    fn is_whole_word(&self, range: Range) -> bool {
        let len = self.rope.len_chars();
        let before = range.start > 0 && is_word_char(self.rope.char(range.start - 1));
        let after = range.end < len && is_word_char(self.rope.char(range.end));
        !before && !after
    }

    /// Expand `\0`..`\9` and `\\` using the last regex captures
    fn expand_replacement(&self, text: &str) -> String {
        let mut expanded = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '\\' {
                expanded.push(c);
                continue;
            }
            match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    chars.next();
                    let index = d as usize - '0' as usize;
                    if let Some(Some(group)) = self.captures.get(index) {
                        expanded.push_str(group);
                    }
                }
                Some('\\') => {
                    chars.next();
                    expanded.push('\\');
                }
                _ => expanded.push('\\'),
            }
        }

        expanded
    }
}

/// Leftmost match starting at or after `at` that ends by `hi`.
fn match_within<'h>(regex: &Regex, haystack: &'h str, at: usize, hi: usize) -> Option<Captures<'h>> {
    let caps = regex.captures_at(haystack, at)?;
    let m = caps.get(0)?;
    if m.start() > hi {
        return None;
    }
    if m.end() <= hi {
        return Some(caps);
    }
    // Too long: a shorter match may fit when the text ends at `hi`
    regex.captures_at(&haystack[..hi], m.start())
}

/// Byte offset of the character after the one at `at`, past the end if none
fn next_boundary(haystack: &str, at: usize) -> usize {
    haystack[at..]
        .chars()
        .next()
        .map_or(haystack.len() + 1, |c| at + c.len_utf8())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Default for RopeSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSurface for RopeSurface {
    fn length(&self) -> usize {
        self.rope.len_chars()
    }

    fn text_range(&self, start: usize, end: usize) -> String {
        let len = self.rope.len_chars();
        let (start, end) = (start.min(end).min(len), start.max(end).min(len));
        self.rope.slice(start..end).to_string()
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_from_position(&self, pos: usize) -> usize {
        self.rope.char_to_line(pos.min(self.rope.len_chars()))
    }

    fn position_from_line(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            self.rope.len_chars()
        } else {
            self.rope.line_to_char(line)
        }
    }

    fn line_end_position(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let start = self.rope.line_to_char(line);
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        start + len
    }

    fn anchor(&self) -> usize {
        self.anchor
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn set_selection(&mut self, anchor: usize, caret: usize) {
        let len = self.rope.len_chars();
        self.anchor = anchor.min(len);
        self.caret = caret.min(len);
    }

    fn search_in_range(
        &mut self,
        pattern: &str,
        start: usize,
        end: usize,
        flags: SearchFlags,
    ) -> Option<Range> {
        if pattern.is_empty() {
            return None;
        }

        let len = self.rope.len_chars();
        let backwards = start > end;
        let lo = start.min(end).min(len);
        let hi = start.max(end).min(len);

        let regex = self.compile(pattern, flags)?;

        // Search whole lines so that anchors and word boundaries see the
        // text around the range, then keep matches inside [lo, hi]
        let ctx_start = self.rope.line_to_char(self.rope.char_to_line(lo));
        let ctx_end = self.line_end_position(self.rope.char_to_line(hi)).max(hi);
        let haystack = self.rope.slice(ctx_start..ctx_end).to_string();
        let lo_byte = self.rope.slice(ctx_start..lo).len_bytes();
        let hi_byte = self.rope.slice(ctx_start..hi).len_bytes();

        let mut found = None;
        let mut at = lo_byte;
        let mut byte_pos = 0;
        let mut char_pos = ctx_start;
        while at <= hi_byte {
            let Some(caps) = match_within(&regex, &haystack, at, hi_byte) else {
                break;
            };
            let Some(m) = caps.get(0) else {
                break;
            };

            // Byte offsets in the haystack -> char offsets in the document
            char_pos += haystack[byte_pos..m.start()].chars().count();
            byte_pos = m.start();
            let range = Range::new(char_pos, char_pos + m.as_str().chars().count());

            // Matches may overlap: backwards wants the one starting last
            at = next_boundary(&haystack, m.start());

            if flags.whole_word && !self.is_whole_word(range) {
                continue;
            }

            let groups: Vec<Option<String>> = if flags.regex {
                caps.iter()
                    .map(|g| g.map(|g| g.as_str().to_string()))
                    .collect()
            } else {
                Vec::new()
            };
            found = Some((range, groups));

            if !backwards {
                break;
            }
        }

        let (range, groups) = found?;
        if flags.regex {
            self.captures = groups;
        }
        Some(range)
    }

    fn replace_range(&mut self, range: Range, text: &str, regex: bool) -> usize {
        let len = self.rope.len_chars();
        let start = range.min().min(len);
        let end = range.max().min(len);

        let replacement = if regex {
            self.expand_replacement(text)
        } else {
            text.to_string()
        };

        self.begin_undo_group();
        self.delete_range(start, end);
        let new_end = self.insert(start, &replacement);
        self.end_undo_group();

        new_end
    }

    fn begin_undo_group(&mut self) {
        self.history.begin_group();
    }

    fn end_undo_group(&mut self) {
        self.history.end_group();
    }

    fn undo(&mut self) -> Option<usize> {
        let action = self.history.undo()?;
        let caret = self.apply_action(&action);
        Some(self.after_history_step(caret))
    }

    fn redo(&mut self) -> Option<usize> {
        let action = self.history.redo()?;
        let caret = self.apply_action(&action);
        Some(self.after_history_step(caret))
    }

    fn scroll_range(&mut self, anchor: usize, caret: usize) {
        let total = self.rope.len_lines();
        let from = self.line_from_position(anchor);
        let to = self.line_from_position(caret);
        self.viewport.ensure_span_visible(from, to, total);
    }

    fn marker_get(&self, line: usize) -> u32 {
        self.markers.get(line)
    }

    fn marker_add(&mut self, line: usize, marker: u32) {
        if line < self.rope.len_lines() {
            self.markers.add(line, marker);
        }
    }

    fn marker_delete(&mut self, line: usize, marker: u32) {
        self.markers.delete(line, marker);
    }

    fn marker_delete_all(&mut self, marker: u32) {
        self.markers.delete_all(marker);
    }

    fn marker_next(&self, from_line: usize, mask: u32) -> Option<usize> {
        self.markers.next(from_line, mask)
    }

    fn marker_previous(&self, from_line: usize, mask: u32) -> Option<usize> {
        self.markers.previous(from_line, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(match_case: bool, whole_word: bool, regex: bool) -> SearchFlags {
        SearchFlags {
            match_case,
            whole_word,
            regex,
        }
    }

    #[test]
    fn test_empty_surface() {
        let surface = RopeSurface::new();
        assert_eq!(surface.line_count(), 1); // Rope always has at least 1 line
        assert_eq!(surface.length(), 0);
        assert!(!surface.is_modified());
    }

    #[test]
    fn test_insert_and_delete() {
        let mut surface = RopeSurface::new();

        assert_eq!(surface.insert(0, "hello\nworld"), 11);
        assert_eq!(surface.line_count(), 2);
        assert_eq!(surface.line(0).unwrap(), "hello\n");
        assert!(surface.is_modified());

        assert_eq!(surface.delete_range(5, 11), "\nworld");
        assert_eq!(surface.text(), "hello");
    }

    #[test]
    fn test_line_positions() {
        let surface = RopeSurface::from_text("ab\ncde\n\nf");
        assert_eq!(surface.line_count(), 4);
        assert_eq!(surface.position_from_line(1), 3);
        assert_eq!(surface.line_end_position(1), 6);
        assert_eq!(surface.line_end_position(2), 7);
        assert_eq!(surface.line_end_position(3), 9);
        assert_eq!(surface.line_from_position(4), 1);
        assert_eq!(surface.line_from_position(100), 3);
        assert_eq!(surface.position_from_line(10), 9);
    }

    #[test]
    fn test_search_forward_and_backward() {
        let mut surface = RopeSurface::from_text("one two one two one");

        assert_eq!(
            surface.search_in_range("one", 1, 19, SearchFlags::default()),
            Some(Range::new(8, 11))
        );
        assert_eq!(
            surface.search_in_range("one", 16, 0, SearchFlags::default()),
            Some(Range::new(8, 11))
        );
        // A match may not cross the end of the range
        assert_eq!(surface.search_in_range("one", 17, 19, SearchFlags::default()), None);
    }

    #[test]
    fn test_greedy_match_is_cut_to_range() {
        let mut surface = RopeSurface::from_text("xaaa");
        let regex = flags(false, false, true);

        assert_eq!(surface.search_in_range("a+", 0, 3, regex), Some(Range::new(1, 3)));
        assert_eq!(surface.search_in_range("a+", 3, 0, regex), Some(Range::new(2, 3)));
        assert_eq!(surface.search_in_range("a+", 0, 1, regex), None);
    }

    #[test]
    fn test_backward_search_finds_match_closest_to_start() {
        let mut surface = RopeSurface::from_text("aaa");

        assert_eq!(
            surface.search_in_range("aa", 3, 0, SearchFlags::default()),
            Some(Range::new(1, 3))
        );
        assert_eq!(
            surface.search_in_range("aa", 0, 3, SearchFlags::default()),
            Some(Range::new(0, 2))
        );
    }

    #[test]
    fn test_search_case_and_whole_word() {
        let mut surface = RopeSurface::from_text("Span spans span");

        assert_eq!(
            surface.search_in_range("span", 0, 15, flags(true, false, false)),
            Some(Range::new(5, 9))
        );
        assert_eq!(
            surface.search_in_range("span", 1, 15, flags(false, true, false)),
            Some(Range::new(11, 15))
        );
        assert_eq!(
            surface.search_in_range("span", 0, 15, flags(false, true, false)),
            Some(Range::new(0, 4))
        );
    }

    #[test]
    fn test_whole_word_checks_document_not_slice() {
        let mut surface = RopeSurface::from_text("xspan");
        // The slice starts at 1, but 'x' still precedes the match
        assert_eq!(surface.search_in_range("span", 1, 5, flags(false, true, false)), None);
    }

    #[test]
    fn test_search_literal_escapes_metacharacters() {
        let mut surface = RopeSurface::from_text("a.b axb");
        assert_eq!(
            surface.search_in_range("x.b", 0, 7, SearchFlags::default()),
            None
        );
        assert_eq!(
            surface.search_in_range("a.b", 1, 7, SearchFlags::default()),
            None
        );
        assert_eq!(
            surface.search_in_range("a.b", 1, 7, flags(false, false, true)),
            Some(Range::new(4, 7))
        );
    }

    #[test]
    fn test_anchors_see_surrounding_text() {
        let mut surface = RopeSurface::from_text("one two\nthree");
        let regex = flags(false, false, true);
        assert_eq!(surface.search_in_range("^t", 4, 13, regex), Some(Range::new(8, 9)));
        assert_eq!(surface.search_in_range("o$", 0, 6, regex), None);
        assert_eq!(surface.search_in_range("o$", 0, 7, regex), Some(Range::new(6, 7)));
        assert_eq!(surface.search_in_range(r"\bwo", 0, 7, regex), None);
    }

    #[test]
    fn test_invalid_regex_is_no_match() {
        let mut surface = RopeSurface::from_text("(unclosed");
        assert_eq!(surface.search_in_range("(", 0, 9, flags(false, false, true)), None);
        assert_eq!(
            surface.search_in_range("(", 0, 9, SearchFlags::default()),
            Some(Range::new(0, 1))
        );
    }

    #[test]
    fn test_search_offsets_are_characters() {
        let mut surface = RopeSurface::from_text("żółw ipsum");
        assert_eq!(
            surface.search_in_range("ipsum", 0, 10, SearchFlags::default()),
            Some(Range::new(5, 10))
        );
    }

    #[test]
    fn test_regex_replace_uses_captures() {
        let mut surface = RopeSurface::from_text("key = value");
        let found = surface
            .search_in_range(r"(\w+) = (\w+)", 0, 11, flags(false, false, true))
            .unwrap();

        let end = surface.replace_range(found, r"\2: \1 \\ \9", true);
        assert_eq!(surface.text(), r"value: key \ ");
        assert_eq!(end, surface.length());
    }

    #[test]
    fn test_replace_is_single_undo_step() {
        let mut surface = RopeSurface::from_text("hello world");
        surface.replace_range(Range::new(6, 11), "there", false);
        assert_eq!(surface.text(), "hello there");

        surface.undo();
        assert_eq!(surface.text(), "hello world");
        surface.redo();
        assert_eq!(surface.text(), "hello there");
    }

    #[test]
    fn test_selection_follows_edits() {
        let mut surface = RopeSurface::from_text("abc def ghi");
        surface.set_selection(8, 11);

        surface.insert(0, "XX");
        assert_eq!(surface.selection(), Range::new(10, 13));

        surface.delete_range(0, 6);
        assert_eq!(surface.selection(), Range::new(4, 7));

        surface.delete_range(3, 6);
        assert_eq!(surface.selection(), Range::new(3, 4));
    }

    #[test]
    fn test_markers_follow_lines() {
        let mut surface = RopeSurface::from_text("a\nb\nc\nd");
        surface.marker_add(2, 0);
        surface.marker_add(3, 1);

        surface.insert(0, "new\n");
        assert_eq!(surface.marker_get(3), 1);
        assert_eq!(surface.marker_get(4), 0b10);

        // Join lines 2..4 ("b", "c", "d") into one
        let start = surface.line_end_position(2);
        let end = surface.position_from_line(4);
        surface.delete_range(start, end);
        assert_eq!(surface.marker_get(2), 0b11);

        surface.undo();
        assert_eq!(surface.text(), "new\na\nb\nc\nd");
    }

    #[test]
    fn test_marker_add_ignores_missing_lines() {
        let mut surface = RopeSurface::from_text("one line");
        surface.marker_add(5, 0);
        assert_eq!(surface.marker_next(0, 1), None);
    }

    #[test]
    fn test_scroll_range_moves_viewport() {
        let text = "line\n".repeat(100);
        let mut surface = RopeSurface::from_text(&text);
        surface.viewport_mut().resize(10);

        let pos = surface.position_from_line(50);
        surface.scroll_range(pos, pos + 4);
        assert!(surface.viewport().is_line_visible(50));
    }

    #[test]
    fn test_save_load_cycle_preserves_crlf() {
        use std::fs;
        use tempfile::NamedTempFile;

        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path();
        fs::write(temp_path, "line 1\r\nline 2\r\n").unwrap();

        let mut surface = RopeSurface::from_file(temp_path).unwrap();
        assert_eq!(surface.line_ending(), LineEnding::CRLF);
        assert_eq!(surface.text(), "line 1\nline 2\n");
        assert!(!surface.is_modified());

        let end = surface.line_end_position(1);
        surface.insert(end, "!");
        surface.save().unwrap();

        assert_eq!(fs::read_to_string(temp_path).unwrap(), "line 1\r\nline 2!\r\n");
        assert!(!surface.is_modified());

        // Undo back to the saved text on disk clears the flag
        surface.insert(0, "x");
        assert!(surface.is_modified());
        surface.undo();
        assert!(!surface.is_modified());
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut surface = RopeSurface::from_text("text");
        assert!(surface.save().is_err());
    }
}
