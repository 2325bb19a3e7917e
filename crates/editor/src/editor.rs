//! One open document and its command dispatch.

use anyhow::{Context, Result};
use std::path::Path;

use quire_bookmarks::BookmarkTracker;
use quire_config::{Config, EditorSettings, SearchSettings};
use quire_languages::{EditorConfigProperties, EndOfLine, IndentStyle, Language, LanguageRegistry};
use quire_search::{SearchCoordinator, SearchRequest};
use quire_surface::{LineEnding, RopeSurface, TextSurface};

use crate::command::{Command, Outcome};
use crate::save::SaveHooks;

/// Editor session over a text surface.
pub struct Editor<S: TextSurface = RopeSurface> {
    surface: S,
    search: SearchCoordinator,
    bookmarks: BookmarkTracker,
    language: Option<Language>,
    editorconfig: EditorConfigProperties,
    settings: EditorSettings,
    search_defaults: SearchSettings,
}

impl<S: TextSurface> Editor<S> {
    /// Session over `surface` with the given preferences.
    pub fn new(surface: S, config: &Config) -> Self {
        Self {
            surface,
            search: SearchCoordinator::new(),
            bookmarks: BookmarkTracker::new(),
            language: None,
            editorconfig: EditorConfigProperties::default(),
            settings: config.editor.clone(),
            search_defaults: config.search.clone(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn search(&self) -> &SearchCoordinator {
        &self.search
    }

    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    pub fn editorconfig(&self) -> &EditorConfigProperties {
        &self.editorconfig
    }

    pub fn set_editorconfig(&mut self, properties: EditorConfigProperties) {
        self.editorconfig = properties;
    }

    /// Request for `pattern` using the configured search defaults.
    pub fn search_request(&self, pattern: impl Into<String>) -> SearchRequest {
        SearchRequest {
            match_case: self.search_defaults.match_case,
            match_word: self.search_defaults.whole_word,
            regex: self.search_defaults.regex,
            wrap_around: self.search_defaults.wrap_around,
            ..SearchRequest::new(pattern)
        }
    }

    /// Tab width: `.editorconfig` first, then preferences.
    pub fn tab_width(&self) -> usize {
        self.editorconfig
            .effective_tab_width()
            .unwrap_or(self.settings.tab_width)
    }

    /// Whether indentation uses spaces.
    pub fn indent_with_spaces(&self) -> bool {
        match self.editorconfig.indent_style {
            Some(style) => style == IndentStyle::Space,
            None => self.settings.indent_with_spaces,
        }
    }

    fn save_hooks(&self) -> SaveHooks {
        SaveHooks {
            trim_trailing_whitespace: self
                .editorconfig
                .trim_trailing_whitespace
                .unwrap_or(self.settings.trim_trailing_whitespace),
            insert_final_newline: self
                .editorconfig
                .insert_final_newline
                .unwrap_or(self.settings.append_final_newline),
        }
    }

    /// Run `command` against the document.
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        quire_logger::debug(format!("Dispatch {:?}", command));
        let surface = &mut self.surface;

        match command {
            Command::Find(request) => Outcome::Found(self.search.find(surface, &request)),
            Command::Replace { replacement, regex } => {
                Outcome::Replaced(usize::from(self.search.replace(surface, &replacement, regex)))
            }
            Command::ReplaceAndFind => Outcome::Found(self.search.replace_and_find(surface)),
            Command::ReplaceAll(request) => Outcome::Replaced(self.search.replace_all(surface, &request)),
            Command::ResetSearch => {
                self.search.reset_search();
                Outcome::Nothing
            }

            Command::IncrementalSearch(term) => {
                Outcome::Found(self.search.incremental_search(surface, &term))
            }
            Command::IncrementalSearchCancel => {
                self.search.incremental_search_cancel(surface);
                Outcome::Moved
            }
            Command::IncrementalSearchCommit(term) => {
                self.search.incremental_search_commit(&term);
                Outcome::Nothing
            }

            Command::ToggleBookmark(line) => Outcome::BookmarkToggled(self.bookmarks.toggle(surface, line)),
            Command::NextBookmark => moved_if(self.bookmarks.next(surface).is_some()),
            Command::PreviousBookmark => moved_if(self.bookmarks.previous(surface).is_some()),
            Command::ClearBookmarks => {
                self.bookmarks.clear(surface);
                Outcome::Nothing
            }

            Command::GoToLine(number) => {
                let last = surface.line_count().saturating_sub(1);
                let line = number.saturating_sub(1).min(last);
                let pos = surface.position_from_line(line);
                surface.set_selection(pos, pos);
                surface.scroll_range(pos, pos);
                Outcome::Moved
            }
            Command::Undo => moved_if(surface.undo().is_some()),
            Command::Redo => moved_if(surface.redo().is_some()),
            Command::PrepareSave => {
                let hooks = self.save_hooks();
                hooks.apply(&mut self.surface);
                Outcome::Nothing
            }
        }
    }

    /// Bookmarked lines (0-based).
    pub fn bookmarks(&self) -> Vec<usize> {
        self.bookmarks.bookmarks(&self.surface)
    }
}

fn moved_if(moved: bool) -> Outcome {
    if moved {
        Outcome::Moved
    } else {
        Outcome::Nothing
    }
}

impl Editor<RopeSurface> {
    /// Open `path`, detecting its language and reading `.editorconfig`.
    pub fn open(path: &Path, config: &Config, registry: &LanguageRegistry) -> Result<Self> {
        let mut surface = RopeSurface::from_file(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        surface.set_undo_limit(config.editor.undo_limit);

        let first_line = surface.line(0);
        let language = registry.detect(path, first_line.as_deref()).copied();
        match &language {
            Some(language) => quire_logger::info(format!("Opened {} as {}", path.display(), language.name)),
            None => quire_logger::info(format!("Opened {}", path.display())),
        }

        let mut editor = Self::new(surface, config);
        editor.language = language;

        if config.editor.use_editorconfig {
            match EditorConfigProperties::resolve(path) {
                Ok(properties) => editor.apply_editorconfig(properties),
                Err(e) => quire_logger::warn(format!("Ignoring .editorconfig: {:#}", e)),
            }
        }

        Ok(editor)
    }

    fn apply_editorconfig(&mut self, properties: EditorConfigProperties) {
        match properties.end_of_line {
            Some(EndOfLine::Lf) => self.surface.set_line_ending(LineEnding::LF),
            Some(EndOfLine::CrLf) => self.surface.set_line_ending(LineEnding::CRLF),
            Some(EndOfLine::Cr) => quire_logger::warn("end_of_line = cr is not supported, keeping file line endings"),
            None => {}
        }
        self.editorconfig = properties;
    }

    /// Apply the save hooks and write back to the opened file.
    pub fn save(&mut self) -> Result<()> {
        self.dispatch(Command::PrepareSave);
        self.surface.save()?;
        if let Some(path) = self.surface.file_path() {
            quire_logger::info(format!("Saved {}", path.display()));
        }
        Ok(())
    }

    /// Apply the save hooks and write to `path`.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        self.dispatch(Command::PrepareSave);
        self.surface.save_to(path)?;
        quire_logger::info(format!("Saved {}", path.display()));
        Ok(())
    }
}
