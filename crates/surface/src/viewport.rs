/// Vertical window onto the document.
/// Tracks which lines a view of the surface would show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    /// First visible line (0-based)
    pub top_line: usize,
    /// Number of visible lines
    pub height: usize,
}

impl Viewport {
    /// Create a new viewport
    pub fn new(height: usize) -> Self {
        Self {
            top_line: 0,
            height: height.max(1),
        }
    }

    /// Update viewport height
    pub fn resize(&mut self, height: usize) {
        self.height = height.max(1);
    }

    /// Get index of last visible line (exclusive)
    pub fn bottom_line(&self) -> usize {
        self.top_line + self.height
    }

    /// Check if line is visible
    pub fn is_line_visible(&self, line: usize) -> bool {
        line >= self.top_line && line < self.bottom_line()
    }

    /// Scroll so that `line` is visible.
    /// Returns true if viewport was changed
    pub fn ensure_line_visible(&mut self, line: usize, total_lines: usize) -> bool {
        let mut changed = false;

        if line < self.top_line {
            self.top_line = line;
            changed = true;
        } else if line >= self.bottom_line() {
            self.top_line = line.saturating_sub(self.height - 1);
            changed = true;
        }

        // Limit top_line to avoid empty space at bottom
        let max_top = total_lines.saturating_sub(self.height);
        if self.top_line > max_top {
            self.top_line = max_top;
            changed = true;
        }

        changed
    }

    /// Scroll so that the span between `from_line` and `to_line` is visible.
    ///
    /// `to_line` wins when the span is taller than the viewport.
    pub fn ensure_span_visible(&mut self, from_line: usize, to_line: usize, total_lines: usize) -> bool {
        let changed = self.ensure_line_visible(from_line, total_lines);
        self.ensure_line_visible(to_line, total_lines) || changed
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(24)
    }
}
