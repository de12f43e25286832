use super::{changed, replace_cell, Formatter, FormattingConfig};
use crate::model::names::title_case;
use crate::model::{SourceFile, StatementKind};

/// Title case for setting names: `test setup` becomes `Test Setup`,
/// `[arguments]` becomes `[Arguments]`
#[derive(Debug, Default)]
pub struct NormalizeSettingName;

fn normalized_name(kind: StatementKind, value: &str) -> String {
    match kind {
        StatementKind::BlockSetting => {
            let inner = value.trim_start_matches('[').trim_end_matches(']').trim();
            format!("[{}]", title_case(&inner.to_lowercase()))
        }
        _ => title_case(&value.to_lowercase()),
    }
}

impl Formatter for NormalizeSettingName {
    fn name(&self) -> &'static str {
        "NormalizeSettingName"
    }

    fn docs(&self) -> &'static str {
        "Normalizes setting names in the Settings section and in test cases and keywords to title case."
    }

    fn format(&self, file: &SourceFile, _config: &FormattingConfig) -> Option<String> {
        let mut lines: Vec<String> = file.lines.iter().map(|l| l.text.clone()).collect();
        let suite_settings = file.settings();
        let block_settings = file
            .tests()
            .chain(file.keywords())
            .flat_map(|block| block.statements.iter())
            .filter(|s| s.kind == StatementKind::BlockSetting);
        for statement in suite_settings.chain(block_settings) {
            let name = normalized_name(statement.kind, &statement.name.value);
            if name != statement.name.value {
                let index = statement.line - 1;
                lines[index] = replace_cell(&lines[index], &statement.name, &name);
            }
        }
        changed(file, &lines, file.ends_with_newline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(source: &str) -> Option<String> {
        NormalizeSettingName.format(&SourceFile::parse("a.robot", source), &FormattingConfig::default())
    }

    #[test]
    fn title_cases_suite_settings() {
        let result = format("*** Settings ***\nsuite SETUP    Log    x\nlibrary    Collections\n");
        assert_eq!(result.as_deref(), Some("*** Settings ***\nSuite Setup    Log    x\nLibrary    Collections\n"));
    }

    #[test]
    fn title_cases_block_settings() {
        let result = format("*** Keywords ***\nKw\n    [ARGUMENTS]    ${a}\n    [return]    ${a}\n");
        assert_eq!(
            result.as_deref(),
            Some("*** Keywords ***\nKw\n    [Arguments]    ${a}\n    [Return]    ${a}\n")
        );
    }

    #[test]
    fn keyword_calls_are_untouched() {
        assert_eq!(format("*** Keywords ***\nKw\n    log    x\n"), None);
    }
}
