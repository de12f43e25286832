use std::path::PathBuf;

use robocop_core::config::{ConfigManager, ManagerOptions, RawConfig, RawLint};
use robocop_core::linter::reports::ResultsCache;
use robocop_core::linter::Linter;
use robocop_test_utils::TestWorkspace;

const UNDOCUMENTED: &str = "*** Keywords ***\nKeyword\n    No Operation\n";

fn run(workspace: &TestWorkspace, overrides: RawConfig) -> robocop_core::linter::LintOutcome {
    let options = ManagerOptions { overrides, ..ManagerOptions::default() };
    let manager = ConfigManager::with_cwd(options, workspace.root().to_path_buf()).unwrap();
    Linter::new(manager).run().unwrap()
}

fn select(rules: &[&str]) -> RawConfig {
    RawConfig {
        lint: RawLint { select: rules.iter().map(|r| r.to_string()).collect(), ..RawLint::default() },
        ..RawConfig::default()
    }
}

#[test]
fn lints_every_source_of_a_project() {
    // Arrange
    let workspace = TestWorkspace::new()
        .file("suite.robot", UNDOCUMENTED)
        .file("resources/common.resource", UNDOCUMENTED)
        .file("notes.txt", "not robot");

    let mut overrides = select(&["DOC01"]);
    overrides.lint.reports = vec!["rules_by_error_type".into()];

    // Act
    let outcome = run(&workspace, overrides);

    // Assert
    assert_eq!(outcome.files, 2);
    assert_eq!(outcome.issues, 2);
    assert_eq!(outcome.exit_code, 1);
    let printed = outcome.output.join("\n");
    assert!(printed.contains("suite.robot:2:1 [W] DOC01"), "{}", printed);
    assert!(printed.contains("Found 2 issues"), "{}", printed);
}

#[test]
fn nested_configuration_applies_to_its_directory() {
    let workspace = TestWorkspace::new()
        .config("", "[lint]\nselect = [\"DOC01\"]\n")
        .config("strict", "[lint]\nselect = [\"DOC01\", \"SPC02\"]\n")
        .file("a.robot", UNDOCUMENTED)
        .file("strict/b.robot", UNDOCUMENTED.trim_end());

    let outcome = run(&workspace, RawConfig::default());

    assert_eq!(outcome.files, 2);
    assert_eq!(outcome.issues, 3);
}

#[test]
fn root_configuration_drives_run_options() {
    // Arrange
    let workspace = TestWorkspace::new()
        .config(
            "",
            "[lint]\nselect = [\"DOC01\"]\nexit_zero = true\nissue_format = \"CUSTOM {rule_id}\"\nreports = [\"rules_by_error_type\"]\n",
        )
        .file("a.robot", UNDOCUMENTED);

    // Act
    let outcome = run(&workspace, RawConfig::default());

    // Assert
    assert_eq!(outcome.issues, 1);
    assert_eq!(outcome.exit_code, 0);
    let printed = outcome.output.join("\n");
    assert!(printed.contains("CUSTOM DOC01"), "{}", printed);
    assert!(printed.contains("Found 1 issue"), "{}", printed);
}

#[test]
fn persistent_runs_are_compared_with_the_previous_one() {
    // Arrange
    let workspace = TestWorkspace::new()
        .config(
            "",
            "[lint]\nselect = [\"DOC01\"]\nreports = [\"rules_by_id\", \"compare_runs\"]\npersistent = true\n",
        )
        .file("a.robot", UNDOCUMENTED)
        .file("b.robot", UNDOCUMENTED);
    let cache_dir = tempfile::TempDir::new().unwrap();
    let lint = || {
        let options = ManagerOptions::default();
        let manager = ConfigManager::with_cwd(options, workspace.root().to_path_buf()).unwrap();
        let mut linter = Linter::new(manager).with_results_cache(ResultsCache::new(cache_dir.path()));
        linter.run().unwrap()
    };

    // Act
    let first = lint();
    std::fs::write(
        workspace.root().join("b.robot"),
        "*** Keywords ***\nKeyword\n    [Documentation]    Doc\n    No Operation\n",
    )
    .unwrap();
    let second = lint();

    // Assert
    assert!(first.output.join("\n").contains("DOC01 [missing-doc-keyword] : 2"));
    let printed = second.output.join("\n");
    assert!(printed.contains("DOC01 [missing-doc-keyword] : 1 (-1)"), "{}", printed);
}

#[test]
fn excluded_and_gitignored_paths_are_skipped() {
    let workspace = TestWorkspace::new()
        .config("", "exclude = [\"generated\"]\n[lint]\nselect = [\"DOC01\"]\n")
        .file(".gitignore", "build/\n")
        .file("a.robot", UNDOCUMENTED)
        .file("generated/b.robot", UNDOCUMENTED)
        .file("build/c.robot", UNDOCUMENTED);

    let outcome = run(&workspace, RawConfig::default());

    assert_eq!(outcome.files, 1);
}

#[test]
fn exit_zero_keeps_success_status() {
    let workspace = TestWorkspace::new().file("a.robot", UNDOCUMENTED);
    let mut overrides = select(&["DOC01"]);
    overrides.lint.exit_zero = Some(true);

    let outcome = run(&workspace, overrides);

    assert_eq!(outcome.issues, 1);
    assert_eq!(outcome.exit_code, 0);
}

#[test]
fn json_report_is_written_next_to_cwd() {
    let workspace = TestWorkspace::new().file("a.robot", UNDOCUMENTED);
    let mut overrides = select(&["DOC01"]);
    overrides.lint.reports = vec!["json_report".into()];

    run(&workspace, overrides);

    let report: serde_json::Value = serde_json::from_str(&workspace.read("robocop.json")).unwrap();
    assert_eq!(report[0]["rule_id"], "DOC01");
    assert_eq!(report[0]["source"], "a.robot");
}

#[test]
fn explicit_missing_source_is_an_error() {
    let workspace = TestWorkspace::new();
    let options = ManagerOptions { sources: vec![PathBuf::from("missing.robot")], ..ManagerOptions::default() };
    let error = ConfigManager::with_cwd(options, workspace.root().to_path_buf()).err().unwrap();
    assert_eq!(error.to_string(), "Path missing.robot does not exist");
}
