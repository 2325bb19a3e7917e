mod cli;

use anyhow::Result;

use quire_config::Config;
use quire_editor::{Command, Editor, Outcome};
use quire_languages::LanguageRegistry;
use quire_logger::LogLevel;
use quire_search::SearchRequest;
use quire_surface::TextSurface;

use cli::{Action, Options};

fn main() -> Result<()> {
    let options = cli::parse(std::env::args_os()).unwrap_or_else(|e| e.exit());

    let config = match &options.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };
    init_logger(&config);

    let report = run(&options, &config)?;
    for message in &report.messages {
        eprintln!("{}", message);
    }
    if let Some(text) = report.text {
        print!("{}", text);
    }

    Ok(())
}

fn init_logger(config: &Config) {
    let min_level = config.logging.min_level.parse().unwrap_or(LogLevel::Info);
    quire_logger::init(config.log_file_path().ok(), config.logging.max_entries, min_level);
    if config.logging.min_level.parse::<LogLevel>().is_err() {
        quire_logger::warn(format!("Unknown log level {:?}, using info", config.logging.min_level));
    }
}

/// What a run produced.
#[derive(Debug, Default)]
struct Report {
    /// Notices for the user, in order
    messages: Vec<String>,
    /// Resulting document on a dry run
    text: Option<String>,
}

fn run(options: &Options, config: &Config) -> Result<Report> {
    let registry = LanguageRegistry::builtin().with_overrides(&config.languages.extensions);
    let mut editor = Editor::open(&options.file, config, &registry)?;
    let mut report = Report::default();

    let mut previous_find: Option<&str> = None;
    for action in &options.actions {
        // In-selection searches work on the given range, except that a
        // repeated Find continues from its last match
        let rescope = match action {
            Action::Find(pattern) => previous_find != Some(pattern.as_str()),
            Action::ReplaceAll { .. } => true,
            _ => false,
        };
        if let (true, Some((from, to))) = (rescope, options.selection) {
            editor.surface_mut().set_selection(from, to);
        }
        previous_find = match action {
            Action::Find(pattern) => Some(pattern.as_str()),
            _ => None,
        };

        let command = match action {
            Action::Find(pattern) => Command::Find(request(&editor, options, pattern)),
            Action::ReplaceAll { pattern, replacement } => {
                Command::ReplaceAll(request(&editor, options, pattern).with_replacement(replacement.clone()))
            }
            Action::ToggleBookmark(line) => Command::ToggleBookmark(Some(line - 1)),
            Action::GoTo(line) => Command::GoToLine(*line),
        };

        match editor.dispatch(command) {
            Outcome::Found(true) => {
                let surface = editor.surface();
                let start = surface.selection().min();
                let line = surface.line_from_position(start);
                let column = start - surface.position_from_line(line);
                report.messages.push(format!("Found at {}:{}", line + 1, column + 1));
            }
            outcome => report.messages.extend(outcome.notice()),
        }
    }

    let bookmarks = editor.bookmarks();
    if !bookmarks.is_empty() {
        let lines: Vec<String> = bookmarks.iter().map(|line| (line + 1).to_string()).collect();
        report.messages.push(format!("Bookmarks: {}", lines.join(", ")));
    }

    if options.dry_run {
        editor.dispatch(Command::PrepareSave);
        report.text = Some(editor.surface().contents_for_disk());
    } else {
        match &options.output {
            Some(path) => editor.save_to(path)?,
            None => editor.save()?,
        }
    }

    Ok(report)
}

fn request(editor: &Editor, options: &Options, pattern: &str) -> SearchRequest {
    let defaults = editor.search_request(pattern);
    SearchRequest {
        match_case: defaults.match_case || options.match_case,
        match_word: defaults.match_word || options.whole_word,
        regex: defaults.regex || options.regex,
        backwards: options.backwards,
        in_selection: options.selection.is_some(),
        ..defaults
    }
}
