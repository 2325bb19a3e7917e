//! `.editorconfig` section globs.

use anyhow::{Context, Result};
use regex::Regex;

/// Compiled section glob.
///
/// Supports `*`, `**`, `?`, `[abc]`, `[!abc]`, `{a,b}` and numeric
/// ranges `{1..10}`. Paths are relative to the directory of the
/// `.editorconfig` and use `/` as separator.
#[derive(Debug, Clone)]
pub struct Glob {
    regex: Regex,
    /// Bounds for each `{n..m}`, in capture group order
    ranges: Vec<(i64, i64)>,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut ranges = Vec::new();
        // Without a slash the glob matches the file name in any directory
        let anchored = pattern.contains('/');
        let body = translate(pattern.strip_prefix('/').unwrap_or(pattern), &mut ranges);
        let source = if anchored {
            format!("^{}$", body)
        } else {
            format!("^(?:.*/)?{}$", body)
        };

        let regex = Regex::new(&source).with_context(|| format!("Invalid glob: {}", pattern))?;
        Ok(Self { regex, ranges })
    }

    pub fn is_match(&self, path: &str) -> bool {
        let Some(caps) = self.regex.captures(path) else {
            return false;
        };
        self.ranges
            .iter()
            .enumerate()
            .all(|(i, &(lo, hi))| match caps.get(i + 1) {
                Some(m) => m.as_str().parse::<i64>().is_ok_and(|n| n >= lo && n <= hi),
                None => true,
            })
    }
}

fn translate(glob: &str, ranges: &mut Vec<(i64, i64)>) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                i += 1;
                match chars.get(i) {
                    Some(&c) => out.push_str(&escape(c)),
                    None => out.push_str(r"\\"),
                }
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                // "**/" also matches no directory at all
                if (out.is_empty() || out.ends_with('/')) && chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:.*/)?");
                    i += 3;
                    continue;
                }
                out.push_str(".*");
                i += 1;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                if let Some(end) = class_end(&chars, i) {
                    out.push_str(&class(&chars[i + 1..end]));
                    i = end + 1;
                    continue;
                }
                out.push_str(r"\[");
            }
            '{' => {
                if let Some(end) = brace_end(&chars, i) {
                    let inner: String = chars[i + 1..end].iter().collect();
                    out.push_str(&braces(&inner, ranges));
                    i = end + 1;
                    continue;
                }
                out.push_str(r"\{");
            }
            c => out.push_str(&escape(c)),
        }
        i += 1;
    }

    out
}

fn escape(c: char) -> String {
    regex::escape(c.encode_utf8(&mut [0; 4]))
}

/// Index of the `]` closing the class opened at `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    // A class never spans a path separator
    while let Some(&c) = chars.get(j) {
        match c {
            ']' if j > start + 1 => return Some(j),
            '/' => return None,
            _ => j += 1,
        }
    }
    None
}

fn class(content: &[char]) -> String {
    let (negated, body) = match content.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, content),
    };
    if body.is_empty() {
        return r"\[!\]".to_string();
    }

    let mut out = String::from(if negated { "[^/" } else { "[" });
    for &c in body {
        if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(']');
    out
}

/// Index of the `}` matching the `{` at `start`.
fn brace_end(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0;
    let mut j = start;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 1,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}

fn braces(inner: &str, ranges: &mut Vec<(i64, i64)>) -> String {
    if let Some((lo, hi)) = numeric_range(inner) {
        ranges.push((lo.min(hi), lo.max(hi)));
        return r"([+-]?\d+)".to_string();
    }

    let alternatives = split_alternatives(inner);
    if alternatives.len() < 2 {
        return format!(r"\{{{}\}}", translate(inner, ranges));
    }

    let parts: Vec<String> = alternatives
        .iter()
        .map(|alternative| translate(alternative, ranges))
        .collect();
    format!("(?:{})", parts.join("|"))
}

fn numeric_range(inner: &str) -> Option<(i64, i64)> {
    let (lo, hi) = inner.split_once("..")?;
    Some((lo.parse().ok()?, hi.parse().ok()?))
}

/// Split on commas outside nested braces, keeping escapes.
fn split_alternatives(inner: &str) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut depth = 0;
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            ',' if depth == 0 => {
                parts.push(String::new());
                continue;
            }
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        if let Some(part) = parts.last_mut() {
            part.push(c);
            if c == '\\' {
                part.extend(chars.next());
            }
        }
    }

    parts
}
