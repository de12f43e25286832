//! Resolves the configuration of every source and collects the sources to process

use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use super::files::{config_candidates, find_project_root, read_config_file, search_directories};
use super::{Config, RawConfig};
use crate::errors::{RobocopError, RobocopResult};
use crate::files::{is_robot_source, relative_to, ExcludeSet, Gitignore};

#[derive(Debug, Clone, Default)]
pub struct ManagerOptions {
    /// Files and directories to process, the current directory when empty
    pub sources: Vec<PathBuf>,
    /// Explicit configuration file, disables discovery
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub ignore_git_dir: bool,
    pub skip_gitignore: bool,
    pub ignore_file_config: bool,
    /// Command line layer applied on top of any file
    pub overrides: RawConfig,
}

pub struct ConfigManager {
    options: ManagerOptions,
    cwd: PathBuf,
    sources: Vec<PathBuf>,
    root: PathBuf,
    default: Arc<Config>,
    by_directory: HashMap<PathBuf, Arc<Config>>,
    by_file: HashMap<PathBuf, Arc<Config>>,
    excludes: HashMap<Option<PathBuf>, ExcludeSet>,
    gitignore: Gitignore,
    loaded: Vec<PathBuf>,
}

/// Lexically absolute path without `.` and `..` components.
pub fn absolute_path(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() { path.to_path_buf() } else { cwd.join(path) };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

impl ConfigManager {
    pub fn new(options: ManagerOptions) -> RobocopResult<ConfigManager> {
        let cwd = env::current_dir().map_err(|e| RobocopError::io(".", e))?;
        ConfigManager::with_cwd(options, cwd)
    }

    pub fn with_cwd(options: ManagerOptions, cwd: PathBuf) -> RobocopResult<ConfigManager> {
        let requested =
            if options.sources.is_empty() { vec![PathBuf::from(".")] } else { options.sources.clone() };
        let mut sources = Vec::with_capacity(requested.len());
        for source in &requested {
            let absolute = absolute_path(source, &cwd);
            if !absolute.exists() {
                return Err(RobocopError::SourceNotFound(source.clone()));
            }
            sources.push(absolute);
        }

        let root = match &options.root {
            Some(root) => absolute_path(root, &cwd),
            None => find_project_root(&sources),
        };

        let mut loaded = Vec::new();
        let default = match &options.config {
            Some(path) => {
                let path = absolute_path(path, &cwd);
                if !path.is_file() {
                    return Err(RobocopError::ConfigNotFound(path));
                }
                let file_layer = read_config_file(&path)?.unwrap_or_default();
                let mut config = Config::with_layers(&[&file_layer, &options.overrides])?;
                config.config_source = Some(path.clone());
                loaded.push(path);
                config
            }
            None => Config::with_layers(&[&options.overrides])?,
        };

        let gitignore = if options.skip_gitignore { Gitignore::default() } else { Gitignore::load(&root) };

        let mut manager = ConfigManager {
            options,
            cwd,
            sources,
            root,
            default: Arc::new(default),
            by_directory: HashMap::new(),
            by_file: HashMap::new(),
            excludes: HashMap::new(),
            gitignore,
            loaded,
        };
        // run-level settings (reports, exit_zero, verbosity) come from the project root
        if manager.uses_discovery() {
            let root = manager.root.clone();
            manager.default = manager.config_for_directory(&root)?;
        }
        Ok(manager)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Run-level configuration: `--config` or the file found for the project
    /// root, under the command line overrides
    pub fn default_config(&self) -> Arc<Config> {
        Arc::clone(&self.default)
    }

    /// Configuration files read so far, in load order
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded
    }

    fn uses_discovery(&self) -> bool {
        self.options.config.is_none() && !self.options.ignore_file_config
    }

    /// Configuration that applies to sources in `directory`.
    pub fn config_for_directory(&mut self, directory: &Path) -> RobocopResult<Arc<Config>> {
        if !self.uses_discovery() {
            return Ok(self.default_config());
        }
        if let Some(config) = self.by_directory.get(directory) {
            return Ok(Arc::clone(config));
        }
        let mut found = None;
        'search: for candidate_dir in search_directories(directory, self.options.ignore_git_dir) {
            for candidate in config_candidates(&candidate_dir) {
                if let Some(config) = self.by_file.get(&candidate) {
                    found = Some(Arc::clone(config));
                    break 'search;
                }
                if let Some(file_layer) = read_config_file(&candidate)? {
                    let mut config = Config::with_layers(&[&file_layer, &self.options.overrides])?;
                    config.config_source = Some(candidate.clone());
                    let config = Arc::new(config);
                    self.by_file.insert(candidate.clone(), Arc::clone(&config));
                    self.loaded.push(candidate);
                    found = Some(config);
                    break 'search;
                }
            }
        }
        let config = found.unwrap_or_else(|| self.default_config());
        self.by_directory.insert(directory.to_path_buf(), Arc::clone(&config));
        Ok(config)
    }

    pub fn config_for_source(&mut self, source: &Path) -> RobocopResult<Arc<Config>> {
        let directory = source.parent().unwrap_or(&self.root).to_path_buf();
        self.config_for_directory(&directory)
    }

    fn is_skipped(&mut self, path: &Path, is_dir: bool, config: &Config) -> RobocopResult<bool> {
        let relative = relative_to(path, &self.root);
        if !self.excludes.contains_key(&config.config_source) {
            let excludes = ExcludeSet::from_config(&config.common)?;
            self.excludes.insert(config.config_source.clone(), excludes);
        }
        let excluded = self.excludes.get(&config.config_source).map_or(false, |e| e.is_excluded(&relative));
        Ok(excluded || self.gitignore.is_ignored(&relative, is_dir))
    }

    /// Every source to process with its configuration, in a stable order.
    ///
    /// Files named explicitly are always included. Directories are walked for
    /// `.robot` and `.resource` files, pruning excluded and gitignored paths.
    pub fn paths(&mut self) -> RobocopResult<Vec<(PathBuf, Arc<Config>)>> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for source in self.sources.clone() {
            if source.is_file() {
                if seen.insert(source.clone()) {
                    let config = self.config_for_source(&source)?;
                    paths.push((source, config));
                }
                continue;
            }
            let mut walker = WalkDir::new(&source).sort_by_file_name().into_iter();
            while let Some(entry) = walker.next() {
                let entry = entry.map_err(|e| {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| source.clone());
                    RobocopError::io(path, e.into())
                })?;
                if entry.depth() == 0 {
                    continue;
                }
                let path = entry.path();
                let is_dir = entry.file_type().is_dir();
                // exclusions come from the configuration of the containing directory
                let config = self.config_for_source(path)?;
                if self.is_skipped(path, is_dir, &config)? {
                    if is_dir {
                        walker.skip_current_dir();
                    }
                    continue;
                }
                if !is_dir && is_robot_source(path) && seen.insert(path.to_path_buf()) {
                    paths.push((path.to_path_buf(), config));
                }
            }
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn manager(root: &Path, sources: &[&str]) -> ConfigManager {
        let options = ManagerOptions {
            sources: sources.iter().map(PathBuf::from).collect(),
            ..ManagerOptions::default()
        };
        ConfigManager::with_cwd(options, root.to_path_buf()).unwrap()
    }

    fn relative_names(manager: &mut ConfigManager, root: &Path) -> Vec<String> {
        manager.paths().unwrap().iter().map(|(path, _)| relative_to(path, root)).collect()
    }

    #[test]
    fn nearest_configuration_wins() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        write(&root.join("pyproject.toml"), "[tool.robocop.lint]\nselect = [\"DOC01\"]\n");
        write(&root.join("nested/robocop.toml"), "[lint]\nselect = [\"DOC02\"]\n");
        write(&root.join("a.robot"), "");
        write(&root.join("nested/b.robot"), "");

        // Act
        let mut manager = manager(root, &[]);
        let paths = manager.paths().unwrap();

        // Assert
        let selects: Vec<_> = paths.iter().map(|(_, c)| c.lint.select.clone()).collect();
        assert_eq!(selects, vec![vec!["DOC01".to_string()], vec!["DOC02".to_string()]]);
        assert_eq!(manager.loaded_files().len(), 2);
    }

    #[test]
    fn command_line_overrides_file_values() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        write(&root.join("robocop.toml"), "[lint]\nthreshold = \"W\"\nconfigure = [\"a.b=c\"]\n");
        write(&root.join("a.robot"), "");

        let mut overrides = RawConfig::default();
        overrides.lint.threshold = Some("E".to_string());
        overrides.lint.configure = vec!["d.e=f".to_string()];
        let options = ManagerOptions { overrides, ..ManagerOptions::default() };
        let mut manager = ConfigManager::with_cwd(options, root.to_path_buf()).unwrap();

        let config = manager.config_for_source(&root.join("a.robot")).unwrap();
        assert_eq!(config.lint.threshold, crate::diagnostics::Severity::Error);
        assert_eq!(config.lint.configure, vec!["a.b=c".to_string(), "d.e=f".to_string()]);
    }

    #[test]
    fn root_configuration_becomes_the_default() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        write(&root.join("robocop.toml"), "[lint]\nexit_zero = true\nreports = [\"rules_by_id\"]\n");
        write(&root.join("a.robot"), "");

        // Act
        let manager = manager(root, &[]);

        // Assert
        let default = manager.default_config();
        assert!(default.lint.exit_zero);
        assert_eq!(default.lint.reports, vec!["rules_by_id".to_string()]);
        assert_eq!(default.config_source, Some(root.join("robocop.toml")));
        assert_eq!(manager.loaded_files().len(), 1);
    }

    #[test]
    fn ignore_file_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("robocop.toml"), "[lint]\nselect = [\"DOC01\"]\n");
        write(&root.join("a.robot"), "");
        let options = ManagerOptions { ignore_file_config: true, ..ManagerOptions::default() };
        let mut manager = ConfigManager::with_cwd(options, root.to_path_buf()).unwrap();

        let config = manager.config_for_source(&root.join("a.robot")).unwrap();
        assert!(config.lint.select.is_empty());
        assert!(manager.loaded_files().is_empty());
    }

    #[test]
    fn excluded_and_gitignored_paths_are_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        write(&root.join(".gitignore"), "results/\n");
        write(&root.join("robocop.toml"), "exclude = [\"generated\"]\n");
        write(&root.join("tests/a.robot"), "");
        write(&root.join("tests/lib.py"), "");
        write(&root.join("generated/b.robot"), "");
        write(&root.join("results/c.robot"), "");
        write(&root.join(".venv/d.robot"), "");

        let mut manager = manager(root, &[]);

        assert_eq!(relative_names(&mut manager, root), vec!["tests/a.robot".to_string()]);
    }

    #[test]
    fn explicit_files_are_always_processed() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        write(&root.join("robocop.toml"), "exclude = [\"generated\"]\n");
        write(&root.join("generated/b.robot"), "");

        let mut manager = manager(root, &["generated/b.robot"]);

        assert_eq!(relative_names(&mut manager, root), vec!["generated/b.robot".to_string()]);
    }

    #[test]
    fn missing_source_is_reported() {
        let temp = TempDir::new().unwrap();
        let options = ManagerOptions { sources: vec![PathBuf::from("missing")], ..ManagerOptions::default() };
        let result = ConfigManager::with_cwd(options, temp.path().to_path_buf());
        assert!(matches!(result, Err(RobocopError::SourceNotFound(_))));
    }

    #[test]
    fn explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();
        let options =
            ManagerOptions { config: Some(PathBuf::from("nope.toml")), ..ManagerOptions::default() };
        let result = ConfigManager::with_cwd(options, temp.path().to_path_buf());
        assert!(matches!(result, Err(RobocopError::ConfigNotFound(_))));
    }

    #[test]
    fn absolute_path_drops_dot_components() {
        let cwd = Path::new("/work");
        assert_eq!(absolute_path(Path::new("./a/../b"), cwd), PathBuf::from("/work/b"));
    }
}
