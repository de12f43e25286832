//! Minimal `.gitignore` support for source discovery

use std::fs;
use std::path::Path;

use globset::GlobMatcher;

use super::pattern::path_glob;

#[derive(Debug, Clone)]
struct GitignoreRule {
    matcher: GlobMatcher,
    negated: bool,
    directory_only: bool,
    /// Rules without a slash match the file name at any depth
    basename: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Gitignore {
    rules: Vec<GitignoreRule>,
}

impl Gitignore {
    /// Reads `<root>/.gitignore`; a missing file gives an empty matcher.
    pub fn load(root: &Path) -> Gitignore {
        fs::read_to_string(root.join(".gitignore"))
            .map(|text| Gitignore::parse(&text))
            .unwrap_or_default()
    }

    pub fn parse(text: &str) -> Gitignore {
        let rules = text.lines().filter_map(parse_rule).collect();
        Gitignore { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `relative` is the root-relative path with `/` separators. The last
    /// matching rule decides.
    pub fn is_ignored(&self, relative: &str, is_dir: bool) -> bool {
        let name = relative.rsplit('/').next().unwrap_or(relative);
        let mut ignored = false;
        for rule in &self.rules {
            if rule.directory_only && !is_dir {
                continue;
            }
            let subject = if rule.basename { name } else { relative };
            if rule.matcher.is_match(subject) {
                ignored = !rule.negated;
            }
        }
        ignored
    }
}

fn parse_rule(line: &str) -> Option<GitignoreRule> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (negated, pattern) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line.strip_prefix('\\').unwrap_or(line)),
    };
    let directory_only = pattern.ends_with('/');
    let pattern = pattern.trim_end_matches('/');
    let basename = !pattern.contains('/');
    let pattern = pattern.trim_start_matches('/');
    // git skips patterns it cannot parse
    let matcher = path_glob(pattern, line).ok()?.compile_matcher();
    Some(GitignoreRule { matcher, negated, directory_only, basename })
}
