//! Source file discovery helpers

pub mod gitignore;
pub mod pattern;

use std::path::{Component, Path, PathBuf};

use globset::{GlobSet, GlobSetBuilder};

use crate::config::{CommonConfig, ROBOT_EXTENSIONS};
use crate::errors::{RobocopError, RobocopResult};
use pattern::{path_prefixes, PathPattern};

pub use gitignore::Gitignore;

pub fn is_robot_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ROBOT_EXTENSIONS.contains(&ext))
}

/// Path of `path` below `root` with `/` separators, or the whole path when it
/// is not below `root`.
pub fn relative_to(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Path shown to users: relative to `cwd` when possible.
pub fn display_path(path: &Path, cwd: &Path) -> PathBuf {
    path.strip_prefix(cwd).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf())
}

/// Compiled `default_exclude`, `exclude` and `extend_exclude` patterns.
///
/// Patterns without a slash match any path component, the others match the
/// root-relative path or one of its parent directories.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    components: GlobSet,
    paths: GlobSet,
}

impl ExcludeSet {
    pub fn from_config(config: &CommonConfig) -> RobocopResult<ExcludeSet> {
        let mut components = GlobSetBuilder::new();
        let mut paths = GlobSetBuilder::new();
        for exclusion in config.exclusions() {
            let pattern = PathPattern::new(exclusion)?;
            if pattern.is_component() {
                components.add(pattern.glob().clone());
            } else {
                paths.add(pattern.glob().clone());
            }
        }
        let build = |builder: GlobSetBuilder| {
            builder.build().map_err(|e| RobocopError::InvalidPattern {
                pattern: config.exclusions().cloned().collect::<Vec<_>>().join(", "),
                message: e.to_string(),
            })
        };
        Ok(ExcludeSet { components: build(components)?, paths: build(paths)? })
    }

    pub fn is_excluded(&self, relative: &str) -> bool {
        if relative.is_empty() {
            return false;
        }
        relative.split('/').any(|part| self.components.is_match(part))
            || path_prefixes(relative).any(|prefix| self.paths.is_match(prefix))
    }
}
