//! Edits applied right before a document is written.

use quire_surface::{Range, TextSurface, UndoGroup};

/// What to do to the text before saving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SaveHooks {
    pub trim_trailing_whitespace: bool,
    pub insert_final_newline: bool,
}

impl SaveHooks {
    /// Apply the hooks as one undo step.
    pub fn apply<S: TextSurface + ?Sized>(&self, surface: &mut S) {
        if !self.trim_trailing_whitespace && !self.insert_final_newline {
            return;
        }

        let mut surface = UndoGroup::new(surface);

        if self.trim_trailing_whitespace {
            let mut trimmed = 0;
            // Bottom-up so earlier line positions stay valid
            for line in (0..surface.line_count()).rev() {
                let start = surface.position_from_line(line);
                let end = surface.line_end_position(line);
                let text = surface.text_range(start, end);
                let kept = text.trim_end_matches([' ', '\t']).chars().count();
                if start + kept < end {
                    surface.replace_range(Range::new(start + kept, end), "", false);
                    trimmed += 1;
                }
            }
            if trimmed > 0 {
                quire_logger::debug(format!("Trimmed trailing whitespace on {} lines", trimmed));
            }
        }

        if self.insert_final_newline {
            let len = surface.length();
            if len > 0 && surface.text_range(len - 1, len) != "\n" {
                surface.replace_range(Range::new(len, len), "\n", false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_surface::RopeSurface;

    const BOTH: SaveHooks = SaveHooks {
        trim_trailing_whitespace: true,
        insert_final_newline: true,
    };

    #[test]
    fn test_trim_and_final_newline() {
        let mut surface = RopeSurface::from_text("fn main() {  \n\tlet x = 1;\t\n}");
        BOTH.apply(&mut surface);
        assert_eq!(surface.text(), "fn main() {\n\tlet x = 1;\n}\n");

        // One undo step for the whole pass
        surface.undo();
        assert_eq!(surface.text(), "fn main() {  \n\tlet x = 1;\t\n}");
    }

    #[test]
    fn test_clean_text_is_untouched() {
        let mut surface = RopeSurface::from_text("clean\n");
        BOTH.apply(&mut surface);
        assert_eq!(surface.text(), "clean\n");
        assert!(!surface.history().can_undo());

        let mut empty = RopeSurface::new();
        BOTH.apply(&mut empty);
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_disabled_hooks() {
        let mut surface = RopeSurface::from_text("x  ");
        SaveHooks::default().apply(&mut surface);
        assert_eq!(surface.text(), "x  ");

        let trim_only = SaveHooks {
            trim_trailing_whitespace: true,
            ..Default::default()
        };
        trim_only.apply(&mut surface);
        assert_eq!(surface.text(), "x");
    }
}
