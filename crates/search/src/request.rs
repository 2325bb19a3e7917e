//! Find/replace request parameters.

use quire_surface::SearchFlags;

/// Parameters of one Find / Replace / ReplaceAll invocation.
///
/// Two requests compare equal only when every field matches; the
/// coordinator uses that to tell a repeated search from a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub pattern: String,
    pub replacement: String,
    pub match_case: bool,
    /// Whole word only
    pub match_word: bool,
    pub regex: bool,
    /// Continue from the other end when nothing is left in the scanned range
    pub wrap_around: bool,
    pub backwards: bool,
    /// Restrict the search to the selection
    pub in_selection: bool,
}

impl SearchRequest {
    /// Forward, case-insensitive, literal search for `pattern`.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    /// Set the replacement text
    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    /// Flags in the surface's vocabulary.
    pub fn flags(&self) -> SearchFlags {
        SearchFlags {
            match_case: self.match_case,
            whole_word: self.match_word,
            regex: self.regex,
        }
    }
}
