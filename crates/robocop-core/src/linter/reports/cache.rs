//! Report results kept between runs, grouped by project root

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::errors::{RobocopError, RobocopResult};

pub const CACHE_FILE: &str = ".robocop_cache";

#[derive(Debug, Clone)]
pub struct ResultsCache {
    path: PathBuf,
}

impl ResultsCache {
    pub fn new(directory: impl Into<PathBuf>) -> ResultsCache {
        ResultsCache { path: directory.into().join(CACHE_FILE) }
    }

    /// `robocop` in the user cache directory, `None` when the platform has none
    pub fn user_default() -> Option<ResultsCache> {
        dirs::cache_dir().map(|dir| ResultsCache::new(dir.join("robocop")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored project; a missing or unreadable file counts as empty.
    fn load_all(&self) -> Map<String, Value> {
        let Ok(text) = fs::read_to_string(&self.path) else { return Map::new() };
        match serde_json::from_str(&text) {
            Ok(Value::Object(projects)) => projects,
            _ => Map::new(),
        }
    }

    /// Results stored for `root` by report name
    pub fn load(&self, root: &Path) -> Option<Map<String, Value>> {
        match self.load_all().remove(&root.display().to_string()) {
            Some(Value::Object(results)) => Some(results),
            _ => None,
        }
    }

    /// Replaces the results of `root`, keeping other projects.
    pub fn save(&self, root: &Path, results: Map<String, Value>) -> RobocopResult<()> {
        let mut projects = self.load_all();
        projects.insert(root.display().to_string(), Value::Object(results));
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| RobocopError::io(parent, e))?;
        }
        let text = serde_json::to_string_pretty(&Value::Object(projects)).unwrap_or_else(|_| "{}".to_string());
        fs::write(&self.path, text).map_err(|e| RobocopError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn results(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn keeps_results_per_project_root() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let cache = ResultsCache::new(temp.path().join("robocop"));

        // Act
        cache.save(Path::new("/a"), results(json!({ "file_stats": { "files_count": 1 } }))).unwrap();
        cache.save(Path::new("/b"), results(json!({ "file_stats": { "files_count": 2 } }))).unwrap();
        cache.save(Path::new("/a"), results(json!({ "file_stats": { "files_count": 3 } }))).unwrap();

        // Assert
        assert_eq!(cache.load(Path::new("/a")).unwrap()["file_stats"]["files_count"], 3);
        assert_eq!(cache.load(Path::new("/b")).unwrap()["file_stats"]["files_count"], 2);
        assert!(cache.load(Path::new("/c")).is_none());
    }

    #[test]
    fn unreadable_cache_is_empty() {
        let temp = TempDir::new().unwrap();
        let cache = ResultsCache::new(temp.path());
        assert!(cache.load(Path::new("/a")).is_none());
        fs::write(cache.path(), "not json").unwrap();
        assert!(cache.load(Path::new("/a")).is_none());
    }
}
