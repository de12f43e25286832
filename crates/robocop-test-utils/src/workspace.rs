//! Temporary project directories for end-to-end tests

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A project on disk, removed when dropped
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        TestWorkspace { dir: TempDir::new().expect("create temporary directory") }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes a file, creating parent directories
    pub fn file(self, relative: &str, content: &str) -> Self {
        self.write(relative, content);
        self
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, content).expect("write file");
        path
    }

    /// `robocop.toml` in the given directory, relative to the root
    pub fn config(self, directory: &str, content: &str) -> Self {
        let relative = if directory.is_empty() { "robocop.toml".to_string() } else { format!("{}/robocop.toml", directory) };
        self.file(&relative, content)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read file")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
