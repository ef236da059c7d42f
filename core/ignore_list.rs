//! Ignore matching for `.gptignore` pattern lists.
//!
//! A path is ignored when any active pattern is a substring of it, equals it,
//! or glob-matches it. Containment also applies to wildcard patterns: `*.log`
//! matches anywhere inside the path, so `run.logx` is dropped too. A pattern
//! like `build` also drops `src/build_utils.py`.

use crate::error::{AppError, Result};
use glob::{MatchOptions, Pattern};
use log;
use std::fs;
use std::path::Path;

/// Glob options mirroring shell-style filename matching: `*` crosses path
/// separators, dotfiles are not special, and case folding follows the host.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: !cfg!(windows),
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct ActivePattern {
    raw: String,
    glob: Option<Pattern>,
    /// `glob` widened to match any substring of the path.
    contains: Option<Pattern>,
}

#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    patterns: Vec<String>,
    active: Vec<ActivePattern>,
}

impl IgnoreList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a list from raw lines. Lines are trimmed; comments and blanks
    /// are kept in [`IgnoreList::patterns`] but never take part in matching.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = lines
            .into_iter()
            .map(|line| normalize_separators(line.as_ref().trim()))
            .collect();

        let active = patterns
            .iter()
            .filter(|p| !p.is_empty() && !p.starts_with('#'))
            .map(|raw| {
                let glob = compile(raw);
                let contains = if glob.is_some() && has_wildcards(raw) {
                    compile(&widen(raw))
                } else {
                    None
                };
                ActivePattern {
                    raw: raw.clone(),
                    glob,
                    contains,
                }
            })
            .collect();

        Self { patterns, active }
    }

    /// Read one pattern per line from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading ignore patterns from: {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| AppError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let list = Self::from_lines(content.lines());
        log::debug!(
            "Loaded {} lines ({} active patterns)",
            list.patterns.len(),
            list.active.len()
        );
        Ok(list)
    }

    /// Load from `path` when present, otherwise an empty list.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::empty()),
        }
    }

    /// Every line as loaded, comments and blanks included.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.first_match(relative_path).is_some()
    }

    /// The first active pattern that excludes `relative_path`, if any.
    pub fn first_match(&self, relative_path: &str) -> Option<&str> {
        self.active
            .iter()
            .find(|p| {
                relative_path.contains(p.raw.as_str())
                    || relative_path == p.raw
                    || p.glob
                        .as_ref()
                        .is_some_and(|g| g.matches_with(relative_path, MATCH_OPTIONS))
                    || p.contains
                        .as_ref()
                        .is_some_and(|g| g.matches_with(relative_path, MATCH_OPTIONS))
            })
            .map(|p| p.raw.as_str())
    }

    pub fn is_path_ignored(&self, relative_path: &Path) -> bool {
        self.is_ignored(&relative_path.to_string_lossy())
    }
}

fn compile(raw: &str) -> Option<Pattern> {
    match Pattern::new(raw) {
        Ok(glob) => Some(glob),
        Err(e) => {
            let err = AppError::from(e);
            log::debug!(
                "Pattern \"{}\" is not a valid glob ({}), using substring match only",
                raw,
                err
            );
            None
        }
    }
}

fn has_wildcards(raw: &str) -> bool {
    raw.contains(['*', '?', '['])
}

/// Surround `raw` with `*` so it matches anywhere, without forming a `**`
/// that the glob parser would reject outside a whole path component.
fn widen(raw: &str) -> String {
    let mut widened = String::with_capacity(raw.len() + 2);
    if !raw.starts_with('*') {
        widened.push('*');
    }
    widened.push_str(raw);
    if !raw.ends_with('*') {
        widened.push('*');
    }
    widened
}

#[cfg(windows)]
fn normalize_separators(line: &str) -> String {
    line.replace('/', "\\")
}

#[cfg(not(windows))]
fn normalize_separators(line: &str) -> String {
    line.to_string()
}
