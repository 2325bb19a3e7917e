//! Command line parsing.

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Batch find/replace and bookmarks over one file.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about)]
struct Cli {
    /// File to edit
    file: PathBuf,

    /// Select the next match of PATTERN
    #[arg(long, value_name = "PATTERN", allow_hyphen_values = true)]
    find: Vec<String>,

    /// Replace every match of PATTERN with REPLACEMENT
    #[arg(long, num_args = 2, value_names = ["PATTERN", "REPLACEMENT"], allow_hyphen_values = true)]
    replace_all: Vec<String>,

    /// Flip the bookmark on LINE (1-based)
    #[arg(long, value_name = "LINE", value_parser = line_number)]
    toggle_bookmark: Vec<usize>,

    /// Move the caret to LINE (1-based)
    #[arg(long, value_name = "LINE", value_parser = line_number)]
    goto: Vec<usize>,

    /// Case-sensitive matching
    #[arg(long)]
    match_case: bool,

    /// Match whole words only
    #[arg(long)]
    whole_word: bool,

    /// Treat patterns as regular expressions
    #[arg(long)]
    regex: bool,

    /// Search towards the document start
    #[arg(long)]
    backwards: bool,

    /// Limit searches to the characters FROM..TO
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"])]
    in_selection: Vec<usize>,

    /// Write the result to PATH instead of FILE
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the result instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Use another config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn line_number(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("lines start at 1".to_string()),
        Ok(line) => Ok(line),
        Err(e) => Err(e.to_string()),
    }
}

/// One step to run against the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Find(String),
    ReplaceAll { pattern: String, replacement: String },
    ToggleBookmark(usize),
    GoTo(usize),
}

/// What to do, with the actions in command line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub file: PathBuf,
    pub actions: Vec<Action>,
    pub match_case: bool,
    pub whole_word: bool,
    pub regex: bool,
    pub backwards: bool,
    pub selection: Option<(usize, usize)>,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
}

/// Parse `args`, the program name first.
pub fn parse<I, T>(args: I) -> Result<Options, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command().try_get_matches_from(args)?;
    let cli = Cli::from_arg_matches(&matches)?;
    Ok(cli.into_options(&matches))
}

/// Position of each value of `id` on the command line.
fn indices(matches: &ArgMatches, id: &str) -> Vec<usize> {
    matches
        .indices_of(id)
        .map(|indices| indices.collect())
        .unwrap_or_default()
}

impl Cli {
    fn into_options(self, matches: &ArgMatches) -> Options {
        let mut actions: Vec<(usize, Action)> = Vec::new();

        actions.extend(indices(matches, "find").into_iter().zip(self.find.into_iter().map(Action::Find)));
        for (index, pair) in indices(matches, "replace_all")
            .chunks_exact(2)
            .zip(self.replace_all.chunks_exact(2))
        {
            actions.push((
                index[0],
                Action::ReplaceAll {
                    pattern: pair[0].clone(),
                    replacement: pair[1].clone(),
                },
            ));
        }
        actions.extend(
            indices(matches, "toggle_bookmark")
                .into_iter()
                .zip(self.toggle_bookmark.into_iter().map(Action::ToggleBookmark)),
        );
        actions.extend(indices(matches, "goto").into_iter().zip(self.goto.into_iter().map(Action::GoTo)));
        actions.sort_by_key(|(index, _)| *index);

        Options {
            file: self.file,
            actions: actions.into_iter().map(|(_, action)| action).collect(),
            match_case: self.match_case,
            whole_word: self.whole_word,
            regex: self.regex,
            backwards: self.backwards,
            // The last --in-selection wins
            selection: self.in_selection.chunks_exact(2).last().map(|pair| (pair[0], pair[1])),
            output: self.output,
            dry_run: self.dry_run,
            config: self.config,
        }
    }
}
