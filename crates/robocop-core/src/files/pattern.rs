//! Glob patterns used by exclusions, gitignore entries and rule selection

use globset::{Glob, GlobBuilder, GlobMatcher};

use crate::errors::{RobocopError, RobocopResult};

fn invalid_pattern(pattern: &str, error: globset::Error) -> RobocopError {
    RobocopError::InvalidPattern { pattern: pattern.to_string(), message: error.kind().to_string() }
}

/// Compiles a glob where `*` and `?` stay inside one path component and `**`
/// crosses directories.
pub fn path_glob(glob: &str, original: &str) -> RobocopResult<Glob> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map_err(|e| invalid_pattern(original, e))
}

pub fn is_glob(value: &str) -> bool {
    value.contains(['*', '?', '[', '{'])
}

/// Exclusion pattern matched against root-relative paths
#[derive(Debug, Clone)]
pub struct PathPattern {
    pub source: String,
    glob: Glob,
    matcher: GlobMatcher,
    /// Patterns without `/` match any single path component
    component: bool,
}

impl PathPattern {
    pub fn new(pattern: &str) -> RobocopResult<PathPattern> {
        let trimmed = pattern.trim_end_matches('/').trim_start_matches("./");
        let component = !trimmed.contains('/');
        let glob = path_glob(trimmed.trim_start_matches('/'), pattern)?;
        let matcher = glob.compile_matcher();
        Ok(PathPattern { source: pattern.to_string(), glob, matcher, component })
    }

    pub fn glob(&self) -> &Glob {
        &self.glob
    }

    pub fn is_component(&self) -> bool {
        self.component
    }

    /// `relative` uses `/` separators and no leading `./`.
    pub fn matches(&self, relative: &str) -> bool {
        if self.component {
            return relative.split('/').any(|part| self.matcher.is_match(part));
        }
        // a directory pattern also excludes everything below it
        path_prefixes(relative).any(|prefix| self.matcher.is_match(prefix))
    }
}

/// `a`, `a/b`, `a/b/c` for `a/b/c`
pub fn path_prefixes(relative: &str) -> impl Iterator<Item = &str> {
    relative
        .match_indices('/')
        .map(move |(index, _)| &relative[..index])
        .chain(std::iter::once(relative))
}

/// Name pattern, e.g. `LEN*` or `*-too-long` for rules
#[derive(Debug, Clone)]
pub struct NamePattern {
    pub source: String,
    matcher: GlobMatcher,
}

impl NamePattern {
    pub fn new(pattern: &str) -> RobocopResult<NamePattern> {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| invalid_pattern(pattern, e))?;
        Ok(NamePattern { source: pattern.to_string(), matcher: glob.compile_matcher() })
    }

    pub fn matches(&self, value: &str) -> bool {
        self.matcher.is_match(value)
    }
}
