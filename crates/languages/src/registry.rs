//! File name / extension / shebang -> language mapping.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// A language the editor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Language name, e.g. "rust"
    pub name: &'static str,
    /// Lexer used to style the language
    pub lexer: &'static str,
    /// Extensions without the dot, lowercase
    pub extensions: &'static [&'static str],
    /// Exact file names, e.g. "Makefile"
    pub file_names: &'static [&'static str],
    /// Interpreters named in a `#!` line
    pub interpreters: &'static [&'static str],
    pub line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
}

const C_BLOCK: Option<(&str, &str)> = Some(("/*", "*/"));

const BUILTIN: &[Language] = &[
    Language {
        name: "rust",
        lexer: "rust",
        extensions: &["rs"],
        file_names: &[],
        interpreters: &[],
        line_comment: Some("//"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "python",
        lexer: "python",
        extensions: &["py", "pyw", "pyi"],
        file_names: &["SConstruct", "SConscript"],
        interpreters: &["python", "python2", "python3"],
        line_comment: Some("#"),
        block_comment: None,
    },
    Language {
        name: "go",
        lexer: "cpp",
        extensions: &["go"],
        file_names: &[],
        interpreters: &[],
        line_comment: Some("//"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "javascript",
        lexer: "cpp",
        extensions: &["js", "mjs", "cjs"],
        file_names: &[],
        interpreters: &["node", "nodejs"],
        line_comment: Some("//"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "typescript",
        lexer: "cpp",
        extensions: &["ts", "mts", "cts"],
        file_names: &[],
        interpreters: &["deno", "ts-node"],
        line_comment: Some("//"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "tsx",
        lexer: "cpp",
        extensions: &["tsx"],
        file_names: &[],
        interpreters: &[],
        line_comment: Some("//"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "jsx",
        lexer: "cpp",
        extensions: &["jsx"],
        file_names: &[],
        interpreters: &[],
        line_comment: Some("//"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "c",
        lexer: "cpp",
        extensions: &["c", "h"],
        file_names: &[],
        interpreters: &[],
        line_comment: Some("//"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "cpp",
        lexer: "cpp",
        extensions: &["cpp", "cc", "cxx", "hpp", "hxx", "hh"],
        file_names: &[],
        interpreters: &[],
        line_comment: Some("//"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "java",
        lexer: "cpp",
        extensions: &["java"],
        file_names: &[],
        interpreters: &[],
        line_comment: Some("//"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "ruby",
        lexer: "ruby",
        extensions: &["rb", "gemspec"],
        file_names: &["Rakefile", "Gemfile"],
        interpreters: &["ruby"],
        line_comment: Some("#"),
        block_comment: Some(("=begin", "=end")),
    },
    Language {
        name: "php",
        lexer: "phpscript",
        extensions: &["php"],
        file_names: &[],
        interpreters: &["php"],
        line_comment: Some("//"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "haskell",
        lexer: "haskell",
        extensions: &["hs", "lhs"],
        file_names: &[],
        interpreters: &["runghc", "runhaskell"],
        line_comment: Some("--"),
        block_comment: Some(("{-", "-}")),
    },
    Language {
        name: "nix",
        lexer: "nix",
        extensions: &["nix"],
        file_names: &[],
        interpreters: &[],
        line_comment: Some("#"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "perl",
        lexer: "perl",
        extensions: &["pl", "pm"],
        file_names: &[],
        interpreters: &["perl"],
        line_comment: Some("#"),
        block_comment: None,
    },
    Language {
        name: "lua",
        lexer: "lua",
        extensions: &["lua"],
        file_names: &[],
        interpreters: &["lua"],
        line_comment: Some("--"),
        block_comment: Some(("--[[", "]]")),
    },
    Language {
        name: "sql",
        lexer: "sql",
        extensions: &["sql"],
        file_names: &[],
        interpreters: &[],
        line_comment: Some("--"),
        block_comment: C_BLOCK,
    },
    Language {
        name: "html",
        lexer: "hypertext",
        extensions: &["html", "htm", "xhtml"],
        file_names: &[],
        interpreters: &[],
        line_comment: None,
        block_comment: Some(("<!--", "-->")),
    },
    Language {
        name: "xml",
        lexer: "xml",
        extensions: &["xml", "svg", "xsl"],
        file_names: &[],
        interpreters: &[],
        line_comment: None,
        block_comment: Some(("<!--", "-->")),
    },
    Language {
        name: "css",
        lexer: "css",
        extensions: &["css"],
        file_names: &[],
        interpreters: &[],
        line_comment: None,
        block_comment: C_BLOCK,
    },
    Language {
        name: "json",
        lexer: "json",
        extensions: &["json"],
        file_names: &[".babelrc"],
        interpreters: &[],
        line_comment: None,
        block_comment: None,
    },
    Language {
        name: "toml",
        lexer: "toml",
        extensions: &["toml"],
        file_names: &["Cargo.lock"],
        interpreters: &[],
        line_comment: Some("#"),
        block_comment: None,
    },
    Language {
        name: "yaml",
        lexer: "yaml",
        extensions: &["yaml", "yml"],
        file_names: &[],
        interpreters: &[],
        line_comment: Some("#"),
        block_comment: None,
    },
    Language {
        name: "ini",
        lexer: "props",
        extensions: &["ini", "cfg", "conf", "properties"],
        file_names: &[".editorconfig", ".gitconfig"],
        interpreters: &[],
        line_comment: Some("#"),
        block_comment: None,
    },
    Language {
        name: "bash",
        lexer: "bash",
        extensions: &["sh", "bash", "zsh"],
        file_names: &[".bashrc", ".bash_profile", ".profile", ".zshrc"],
        interpreters: &["sh", "bash", "zsh", "dash", "ksh"],
        line_comment: Some("#"),
        block_comment: None,
    },
    Language {
        name: "makefile",
        lexer: "makefile",
        extensions: &["mk", "mak"],
        file_names: &["Makefile", "makefile", "GNUmakefile"],
        interpreters: &["make"],
        line_comment: Some("#"),
        block_comment: None,
    },
    Language {
        name: "cmake",
        lexer: "cmake",
        extensions: &["cmake"],
        file_names: &["CMakeLists.txt"],
        interpreters: &[],
        line_comment: Some("#"),
        block_comment: None,
    },
    Language {
        name: "dockerfile",
        lexer: "bash",
        extensions: &["dockerfile"],
        file_names: &["Dockerfile", "Containerfile"],
        interpreters: &[],
        line_comment: Some("#"),
        block_comment: None,
    },
    Language {
        name: "diff",
        lexer: "diff",
        extensions: &["diff", "patch"],
        file_names: &[],
        interpreters: &[],
        line_comment: None,
        block_comment: None,
    },
    Language {
        name: "markdown",
        lexer: "markdown",
        extensions: &["md", "markdown"],
        file_names: &[],
        interpreters: &[],
        line_comment: None,
        block_comment: Some(("<!--", "-->")),
    },
];

/// Language table with user extension overrides.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
    /// Lowercase extension -> index into `languages`
    overrides: HashMap<String, usize>,
}

impl LanguageRegistry {
    /// Registry with the built-in languages.
    pub fn builtin() -> Self {
        Self {
            languages: BUILTIN.to_vec(),
            overrides: HashMap::new(),
        }
    }

    /// Map extensions to languages by name, taking precedence over the
    /// built-in extensions. Unknown language names are skipped.
    pub fn with_overrides(mut self, extensions: &BTreeMap<String, String>) -> Self {
        for (extension, name) in extensions {
            match self.languages.iter().position(|l| l.name == name.as_str()) {
                Some(index) => {
                    let extension = extension.trim_start_matches('.').to_lowercase();
                    self.overrides.insert(extension, index);
                }
                None => quire_logger::warn(format!(
                    "Unknown language {:?} for extension {:?}",
                    name, extension
                )),
            }
        }
        self
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Look up a language by name
    pub fn by_name(&self, name: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.name == name)
    }

    /// Detect the language of `path`.
    ///
    /// Exact file name first, then extension (case-insensitive), then the
    /// interpreter of a `#!` first line.
    pub fn detect(&self, path: &Path, first_line: Option<&str>) -> Option<&Language> {
        let file_name = path.file_name().and_then(|n| n.to_str());

        if let Some(file_name) = file_name {
            if let Some(language) = self
                .languages
                .iter()
                .find(|l| l.file_names.iter().any(|n| *n == file_name))
            {
                return Some(language);
            }
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        if let Some(extension) = extension {
            if let Some(&index) = self.overrides.get(&extension) {
                return self.languages.get(index);
            }
            if let Some(language) = self
                .languages
                .iter()
                .find(|l| l.extensions.iter().any(|e| *e == extension))
            {
                return Some(language);
            }
        }

        let interpreter = first_line.and_then(shebang_interpreter)?;
        self.languages
            .iter()
            .find(|l| l.interpreters.iter().any(|i| *i == interpreter))
            .or_else(|| {
                // python3.12 -> python
                let base = interpreter.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
                self.languages
                    .iter()
                    .find(|l| l.interpreters.iter().any(|i| *i == base))
            })
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Interpreter named by a `#!` line, looking through `env`.
fn shebang_interpreter(line: &str) -> Option<&str> {
    let command = line.strip_prefix("#!")?;
    let mut words = command.split_whitespace();
    let program = words.next()?;
    let program = program.rsplit('/').next().unwrap_or(program);

    if program != "env" {
        return Some(program);
    }
    // `env -S python3 -u`
    words.find(|w| !w.starts_with('-') && !w.contains('='))
}
