use robocop_core::config::{ConfigManager, ManagerOptions, RawConfig, RawFormat};
use robocop_core::formatter::{FormatOutcome, SourceFormatter};
use robocop_test_utils::{FormatConfig, SuiteBuilder, TestWorkspace};

const UNFORMATTED: &str = "*** settings ***\nlibrary  Collections\n*** keywords ***\nKeyword\n  Log  x   \n";
const FORMATTED: &str = "*** Settings ***\nLibrary    Collections\n\n\n*** Keywords ***\nKeyword\n    Log    x\n";

fn run(workspace: &TestWorkspace, format: RawFormat) -> FormatOutcome {
    let mut format = format;
    format.line_ending.get_or_insert_with(|| "unix".to_string());
    let options = ManagerOptions { overrides: RawConfig { format, ..RawConfig::default() }, ..ManagerOptions::default() };
    let manager = ConfigManager::with_cwd(options, workspace.root().to_path_buf()).unwrap();
    SourceFormatter::new(manager).run().unwrap()
}

#[test]
fn formats_files_in_place() {
    // Arrange
    let workspace = TestWorkspace::new().file("a.robot", UNFORMATTED).file("b.robot", FORMATTED);

    // Act
    let outcome = run(&workspace, RawFormat::default());

    // Assert
    assert_eq!(outcome.files, 2);
    assert_eq!(outcome.changed, vec![workspace.path("a.robot")]);
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(workspace.read("a.robot"), FORMATTED);
}

#[test]
fn check_mode_reports_without_writing() {
    let workspace = TestWorkspace::new().file("a.robot", UNFORMATTED);

    let outcome = run(&workspace, RawFormat { check: Some(true), diff: Some(true), ..RawFormat::default() });

    assert_eq!(outcome.exit_code, 1);
    assert_eq!(workspace.read("a.robot"), UNFORMATTED);
    assert!(outcome.diffs[0].contains("+Library    Collections"), "{}", outcome.diffs[0]);
}

#[test]
fn check_with_overwrite_writes_and_fails() {
    let workspace = TestWorkspace::new().file("a.robot", UNFORMATTED);

    let outcome = run(&workspace, RawFormat { check: Some(true), overwrite: Some(true), ..RawFormat::default() });

    assert_eq!(outcome.exit_code, 1);
    assert_eq!(workspace.read("a.robot"), FORMATTED);
}

#[test]
fn configuration_file_selects_formatters() {
    let workspace = TestWorkspace::new()
        .config("", "[format]\nselect = [\"NormalizeSectionHeaderName\"]\n")
        .file("a.robot", UNFORMATTED);

    run(&workspace, RawFormat::default());

    assert_eq!(
        workspace.read("a.robot"),
        "*** Settings ***\nlibrary  Collections\n*** Keywords ***\nKeyword\n  Log  x   \n"
    );
}

#[test]
fn tags_are_normalized_when_enabled() {
    let builder = SuiteBuilder::new().setting("Test Tags    Smoke    smoke    API").test("Test").step("Log    x");
    let config = FormatConfig { extend_select: vec!["NormalizeTags".into()], ..FormatConfig::default() };

    let formatted = builder.format_with(&config).unwrap();

    assert!(formatted.starts_with("*** Settings ***\nTest Tags    smoke    api\n"), "{}", formatted);
}

#[test]
fn empty_values_and_settings_are_cleaned_up() {
    let builder = SuiteBuilder::new()
        .setting("Suite Setup")
        .setting("Library    Collections")
        .variable("${EMPTY_VALUE}", &[])
        .keyword("Kw")
        .step("[Tags]")
        .step("No Operation");

    let formatted = builder.format().unwrap();

    let expected = "*** Settings ***\nLibrary    Collections\n\n\n*** Variables ***\n${EMPTY_VALUE}    ${EMPTY}\n\n\n*** Keywords ***\nKw\n    No Operation\n";
    assert_eq!(formatted, expected);
}
