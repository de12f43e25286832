//! Locating and reading configuration files

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use super::{normalize_config_key, RawCommon, RawConfig, RawFormat, RawLint, COMMON_KEYS, CONFIG_NAMES};
use super::{FORMAT_KEYS, LINT_KEYS};
use crate::errors::{did_you_mean, RobocopError, RobocopResult};

/// Reads the robocop settings of a configuration file.
///
/// Returns `Ok(None)` when the file has no robocop section, so discovery can
/// keep looking in parent directories.
pub fn read_config_file(path: &Path) -> RobocopResult<Option<RawConfig>> {
    let text = fs::read_to_string(path).map_err(|e| RobocopError::io(path, e))?;
    parse_config_text(path, &text)
}

pub fn parse_config_text(path: &Path, text: &str) -> RobocopResult<Option<RawConfig>> {
    let mut table: Table = text
        .parse()
        .map_err(|e: toml::de::Error| RobocopError::ConfigFile {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

    let section = match table.remove("tool") {
        Some(Value::Table(mut tool)) => match tool.remove("robocop") {
            Some(Value::Table(robocop)) => robocop,
            Some(_) => {
                return Err(RobocopError::ConfigFile {
                    path: path.to_path_buf(),
                    message: "[tool.robocop] must be a table".to_string(),
                })
            }
            None => return Ok(None),
        },
        Some(_) | None if is_robocop_toml(path) => table,
        _ => return Ok(None),
    };
    raw_config_from_table(path, section).map(Some)
}

fn is_robocop_toml(path: &Path) -> bool {
    path.file_name().map_or(false, |name| name == "robocop.toml")
}

fn normalize_table(path: &Path, table: Table, known: &[&str]) -> RobocopResult<Table> {
    let mut normalized = Table::new();
    for (key, value) in table {
        let key = normalize_config_key(&key);
        if !known.contains(&key.as_str()) {
            return Err(RobocopError::UnknownConfigKey {
                suggestion: did_you_mean(&key, known.iter().copied()),
                key,
                path: path.to_path_buf(),
            });
        }
        normalized.insert(key, value);
    }
    Ok(normalized)
}

fn take_subtable(path: &Path, table: &mut Table, key: &str) -> RobocopResult<Table> {
    match table.remove(key) {
        None => Ok(Table::new()),
        Some(Value::Table(sub)) => Ok(sub),
        Some(_) => Err(RobocopError::ConfigFile {
            path: path.to_path_buf(),
            message: format!("[tool.robocop.{}] must be a table", key),
        }),
    }
}

fn deserialize<T: serde::de::DeserializeOwned>(path: &Path, table: Table) -> RobocopResult<T> {
    Value::Table(table).try_into().map_err(|e: toml::de::Error| RobocopError::ConfigFile {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

pub fn raw_config_from_table(path: &Path, table: Table) -> RobocopResult<RawConfig> {
    let mut common = normalize_table(path, table, COMMON_KEYS)?;
    let lint = normalize_table(path, take_subtable(path, &mut common, "lint")?, LINT_KEYS)?;
    let format = normalize_table(path, take_subtable(path, &mut common, "format")?, FORMAT_KEYS)?;
    Ok(RawConfig {
        common: deserialize::<RawCommon>(path, common)?,
        lint: deserialize::<RawLint>(path, lint)?,
        format: deserialize::<RawFormat>(path, format)?,
    })
}

/// Configuration file candidates of a single directory, in priority order.
pub fn config_candidates(directory: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    CONFIG_NAMES.iter().map(move |name| directory.join(name)).filter(|path| path.is_file())
}

/// Directories searched for configuration of `start`, nearest first.
///
/// The walk ends after the first directory holding `.git` unless `ignore_git_dir`.
pub fn search_directories(start: &Path, ignore_git_dir: bool) -> Vec<PathBuf> {
    let mut directories = Vec::new();
    for directory in start.ancestors() {
        directories.push(directory.to_path_buf());
        if !ignore_git_dir && directory.join(".git").exists() {
            break;
        }
    }
    directories
}

/// Deepest directory containing every source.
pub fn common_base(sources: &[PathBuf]) -> PathBuf {
    let mut iter = sources.iter().map(|source| {
        if source.is_dir() {
            source.clone()
        } else {
            source.parent().map(Path::to_path_buf).unwrap_or_default()
        }
    });
    let Some(mut base) = iter.next() else {
        return PathBuf::from(".");
    };
    for directory in iter {
        while !directory.starts_with(&base) {
            match base.parent() {
                Some(parent) => base = parent.to_path_buf(),
                None => break,
            }
        }
    }
    base
}

/// First ancestor of the sources' common base that looks like a project root.
pub fn find_project_root(sources: &[PathBuf]) -> PathBuf {
    let base = common_base(sources);
    for directory in base.ancestors() {
        let is_root = directory.join(".git").exists()
            || directory.join(".hg").exists()
            || CONFIG_NAMES.iter().any(|name| directory.join(name).is_file());
        if is_root {
            return directory.to_path_buf();
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    fn parse(name: &str, text: &str) -> RobocopResult<Option<RawConfig>> {
        parse_config_text(Path::new(name), text)
    }

    #[test]
    fn reads_all_three_sections() {
        let text = r#"
[tool.robocop]
exclude = ["generated"]

[tool.robocop.lint]
select = ["DOC01"]
threshold = "W"

[tool.robocop.format]
space-count = 2
"#;
        let raw = parse("pyproject.toml", text).unwrap().unwrap();
        assert_eq!(raw.common.exclude, vec!["generated".to_string()]);
        assert_eq!(raw.lint.select, vec!["DOC01".to_string()]);
        assert_eq!(raw.lint.threshold.as_deref(), Some("W"));
        assert_eq!(raw.format.space_count, Some(2));
    }

    #[test_case("pyproject.toml" ; "pyproject")]
    #[test_case("robot.toml" ; "robot toml")]
    fn file_without_robocop_section_is_skipped(name: &str) {
        let text = "[tool.black]\nline-length = 100\n";
        assert_eq!(parse(name, text).unwrap(), None);
    }

    #[test]
    fn robocop_toml_accepts_top_level_keys() {
        let raw = parse("robocop.toml", "[lint]\nignore = [\"LEN*\"]\n").unwrap().unwrap();
        assert_eq!(raw.lint.ignore, vec!["LEN*".to_string()]);
    }

    #[test]
    fn unknown_key_suggests_closest() {
        let err = parse("robocop.toml", "[lint]\nselct = []\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unknown configuration key 'selct'"), "{}", message);
        assert!(message.contains("Did you mean: 'select'?"), "{}", message);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = parse("robocop.toml", "[lint\n").unwrap_err();
        assert!(matches!(err, RobocopError::ConfigFile { .. }));
    }

    #[test]
    fn wrong_value_type_is_a_config_error() {
        let err = parse("robocop.toml", "[lint]\nexit_zero = \"maybe\"\n").unwrap_err();
        assert!(matches!(err, RobocopError::ConfigFile { .. }));
    }

    #[test]
    fn search_stops_at_git_directory() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let nested = repo.join("tests").join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(repo.join(".git")).unwrap();

        // Act
        let stopped = search_directories(&nested, false);
        let full = search_directories(&nested, true);

        // Assert
        assert_eq!(stopped.last(), Some(&repo));
        assert!(full.len() > stopped.len());
    }

    #[test]
    fn project_root_is_first_marked_ancestor() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        let suite = project.join("suites");
        fs::create_dir_all(&suite).unwrap();
        fs::write(project.join("robocop.toml"), "").unwrap();

        assert_eq!(find_project_root(&[suite.clone()]), project);
    }

    #[test]
    fn common_base_of_sibling_directories() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();

        assert_eq!(common_base(&[a, b]), temp.path().to_path_buf());
    }
}
