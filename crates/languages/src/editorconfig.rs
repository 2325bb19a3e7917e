//! `.editorconfig` parsing and per-file property resolution.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::Glob;

pub const EDITORCONFIG_FILE_NAME: &str = ".editorconfig";

/// Properties whose values are case-insensitive.
const KNOWN_PROPERTIES: &[&str] = &[
    "indent_style",
    "indent_size",
    "tab_width",
    "end_of_line",
    "charset",
    "trim_trailing_whitespace",
    "insert_final_newline",
    "max_line_length",
];

/// One `[glob]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub pattern: String,
    /// Lowercase keys with their values, in file order
    pub properties: Vec<(String, String)>,
}

/// A parsed `.editorconfig` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorConfigFile {
    /// `root = true` in the preamble: stop looking in parent directories
    pub root: bool,
    pub sections: Vec<Section>,
}

impl EditorConfigFile {
    /// Parse file content. Malformed lines are skipped.
    pub fn parse(content: &str) -> Self {
        let mut file = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(pattern) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                file.sections.push(Section {
                    pattern: pattern.to_string(),
                    properties: Vec::new(),
                });
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match file.sections.last_mut() {
                Some(section) => {
                    let value = if KNOWN_PROPERTIES.iter().any(|k| *k == key)
                        || value.eq_ignore_ascii_case("unset")
                    {
                        value.to_lowercase()
                    } else {
                        value.to_string()
                    };
                    section.properties.push((key, value));
                }
                None if key == "root" => file.root = value.eq_ignore_ascii_case("true"),
                None => {}
            }
        }

        file
    }

    /// Read and parse the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Sections whose glob matches `relative_path` (`/`-separated).
    pub fn sections_matching<'a>(&'a self, relative_path: &'a str) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections.iter().filter(move |section| match Glob::new(&section.pattern) {
            Ok(glob) => glob.is_match(relative_path),
            Err(e) => {
                quire_logger::warn(format!("Skipping .editorconfig section: {:#}", e));
                false
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Tab,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentSize {
    Columns(usize),
    /// Indent by one tab, `tab_width` wide
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfLine {
    Lf,
    CrLf,
    Cr,
}

/// Properties that apply to one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorConfigProperties {
    pub indent_style: Option<IndentStyle>,
    pub indent_size: Option<IndentSize>,
    pub tab_width: Option<usize>,
    pub end_of_line: Option<EndOfLine>,
    pub charset: Option<String>,
    pub trim_trailing_whitespace: Option<bool>,
    pub insert_final_newline: Option<bool>,
    /// `None` also for `off`
    pub max_line_length: Option<usize>,
    /// Properties without a typed field, raw
    pub other: BTreeMap<String, String>,
}

impl EditorConfigProperties {
    /// Collect the properties for `path` from `.editorconfig` files in its
    /// directory and above, up to the first one marked `root = true`.
    pub fn resolve(path: &Path) -> Result<Self> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(path)
        };

        let mut files: Vec<(PathBuf, EditorConfigFile)> = Vec::new();
        let mut dir = path.parent();
        while let Some(current) = dir {
            let candidate = current.join(EDITORCONFIG_FILE_NAME);
            if candidate.is_file() {
                let file = EditorConfigFile::load(&candidate)?;
                let root = file.root;
                files.push((current.to_path_buf(), file));
                if root {
                    break;
                }
            }
            dir = current.parent();
        }

        Ok(Self::from_files(&path, &files))
    }

    /// Apply `files` (closest directory first) to `path`.
    pub fn from_files(path: &Path, files: &[(PathBuf, EditorConfigFile)]) -> Self {
        let mut raw = BTreeMap::new();

        // Farthest first so closer files override
        for (dir, file) in files.iter().rev() {
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            for section in file.sections_matching(&relative) {
                for (key, value) in &section.properties {
                    if value == "unset" {
                        raw.remove(key);
                    } else {
                        raw.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        Self::from_raw(raw)
    }

    fn from_raw(mut raw: BTreeMap<String, String>) -> Self {
        let number = |value: String| value.parse::<usize>().ok();
        let boolean = |value: String| match value.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        };

        Self {
            indent_style: raw.remove("indent_style").and_then(|v| match v.as_str() {
                "tab" => Some(IndentStyle::Tab),
                "space" => Some(IndentStyle::Space),
                _ => None,
            }),
            indent_size: raw.remove("indent_size").and_then(|v| match v.as_str() {
                "tab" => Some(IndentSize::Tab),
                _ => v.parse().ok().map(IndentSize::Columns),
            }),
            tab_width: raw.remove("tab_width").and_then(number),
            end_of_line: raw.remove("end_of_line").and_then(|v| match v.as_str() {
                "lf" => Some(EndOfLine::Lf),
                "crlf" => Some(EndOfLine::CrLf),
                "cr" => Some(EndOfLine::Cr),
                _ => None,
            }),
            charset: raw.remove("charset"),
            trim_trailing_whitespace: raw.remove("trim_trailing_whitespace").and_then(boolean),
            insert_final_newline: raw.remove("insert_final_newline").and_then(boolean),
            max_line_length: raw.remove("max_line_length").and_then(number),
            other: raw,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Width of a tab character: `tab_width`, else a numeric `indent_size`.
    pub fn effective_tab_width(&self) -> Option<usize> {
        self.tab_width.or(match self.indent_size {
            Some(IndentSize::Columns(columns)) => Some(columns),
            _ => None,
        })
    }

    /// Columns per indentation level.
    pub fn indent_width(&self) -> Option<usize> {
        match self.indent_size {
            Some(IndentSize::Columns(columns)) => Some(columns),
            Some(IndentSize::Tab) => self.tab_width,
            None if self.indent_style == Some(IndentStyle::Tab) => self.tab_width,
            None => None,
        }
    }
}
