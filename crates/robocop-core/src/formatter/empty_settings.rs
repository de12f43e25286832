use std::collections::HashSet;

use super::{changed, invalid_choice, Formatter, FormattingConfig};
use crate::errors::RobocopResult;
use crate::linter::rules::{ParamKind, ParamValue, RuleParam};
use crate::model::{Block, SourceFile, Statement, StatementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum WorkMode {
    /// Keep empty test settings that overwrite a suite default
    #[default]
    OverwriteOk,
    Always,
}

/// Removes settings without values
#[derive(Debug, Default)]
pub struct RemoveEmptySettings {
    work_mode: WorkMode,
}

/// Block setting paired with the suite setting it overwrites
const OVERWRITING: &[(&str, &[&str])] = &[
    ("setup", &["testsetup", "tasksetup"]),
    ("teardown", &["testteardown", "taskteardown"]),
    ("template", &["testtemplate", "tasktemplate"]),
    ("timeout", &["testtimeout", "tasktimeout"]),
];

impl RemoveEmptySettings {
    fn overwrites_default(&self, file: &SourceFile, statement: &Statement) -> bool {
        if self.work_mode == WorkMode::Always {
            return false;
        }
        let name = statement.normalized_setting_name();
        OVERWRITING
            .iter()
            .filter(|(block_setting, _)| *block_setting == name)
            .flat_map(|(_, suite_settings)| suite_settings.iter())
            .any(|suite_setting| file.setting(suite_setting).map_or(false, |s| !s.args.is_empty()))
    }

    fn removable_lines(&self, file: &SourceFile) -> HashSet<usize> {
        let mut lines = HashSet::new();
        let mut remove = |statement: &Statement| lines.extend(statement.line..=statement.end_line);

        for setting in file.settings().filter(|s| s.args.is_empty()) {
            remove(setting);
        }
        let tests: Vec<&Block> = file.tests().collect();
        for block in tests.iter().copied().chain(file.keywords()) {
            let is_test = tests.iter().any(|t| std::ptr::eq(*t, block));
            for statement in &block.statements {
                let empty_setting = statement.kind == StatementKind::BlockSetting && statement.args.is_empty();
                // a setting on the block name line cannot be dropped on its own
                if !empty_setting || statement.line == block.line {
                    continue;
                }
                if is_test && self.overwrites_default(file, statement) {
                    continue;
                }
                remove(statement);
            }
        }
        lines
    }
}

impl Formatter for RemoveEmptySettings {
    fn name(&self) -> &'static str {
        "RemoveEmptySettings"
    }

    fn docs(&self) -> &'static str {
        "Removes settings without values. In the default overwrite_ok mode empty test settings that \
         overwrite a suite setting, such as an empty [Setup] with Test Setup set, are kept."
    }

    fn params(&self) -> &'static [RuleParam] {
        &[RuleParam {
            name: "work_mode",
            default: "overwrite_ok",
            kind: ParamKind::Str,
            description: "overwrite_ok keeps settings that overwrite suite defaults, always removes them",
        }]
    }

    fn set_param(&mut self, param: &str, value: ParamValue) -> RobocopResult<()> {
        if let ParamValue::Str(mode) = value {
            self.work_mode = match mode.as_str() {
                "overwrite_ok" => WorkMode::OverwriteOk,
                "always" => WorkMode::Always,
                _ => return Err(invalid_choice(param, &mode, "overwrite_ok, always")),
            };
        }
        Ok(())
    }

    fn format(&self, file: &SourceFile, _config: &FormattingConfig) -> Option<String> {
        let removed = self.removable_lines(file);
        if removed.is_empty() {
            return None;
        }
        let lines: Vec<&str> = file
            .lines
            .iter()
            .filter(|line| !removed.contains(&line.number))
            .map(|line| line.text.as_str())
            .collect();
        changed(file, &lines, file.ends_with_newline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(formatter: &RemoveEmptySettings, source: &str) -> Option<String> {
        formatter.format(&SourceFile::parse("a.robot", source), &FormattingConfig::default())
    }

    #[test]
    fn removes_empty_suite_and_block_settings() {
        let source = "*** Settings ***\nSuite Setup\nLibrary    Collections\n\n*** Keywords ***\nKw\n    [Documentation]\n    Log    x\n";
        let expected = "*** Settings ***\nLibrary    Collections\n\n*** Keywords ***\nKw\n    Log    x\n";
        assert_eq!(format(&RemoveEmptySettings::default(), source).as_deref(), Some(expected));
    }

    #[test]
    fn keeps_overwriting_setting_by_default() {
        let source = "*** Settings ***\nTest Setup    Open\n\n*** Test Cases ***\nTest\n    [Setup]\n    Log    x\n";
        assert_eq!(format(&RemoveEmptySettings::default(), source), None);

        let mut always = RemoveEmptySettings::default();
        always.set_param("work_mode", ParamValue::Str("always".into())).unwrap();
        let expected = "*** Settings ***\nTest Setup    Open\n\n*** Test Cases ***\nTest\n    Log    x\n";
        assert_eq!(format(&always, source).as_deref(), Some(expected));
    }

    #[test]
    fn rejects_unknown_work_mode() {
        let mut formatter = RemoveEmptySettings::default();
        assert!(formatter.set_param("work_mode", ParamValue::Str("never".into())).is_err());
    }
}
