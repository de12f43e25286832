use std::collections::HashSet;

use super::{build_line, changed, indentation, invalid_choice, Formatter, FormattingConfig};
use crate::errors::RobocopResult;
use crate::linter::rules::{ParamKind, ParamValue, RuleParam};
use crate::model::names::{normalize_robot_name, title_case};
use crate::model::{SourceFile, Statement, StatementKind};

const TAG_SETTINGS: &[&str] = &["testtags", "forcetags", "defaulttags", "keywordtags", "tasktags", "tags"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TagCase {
    #[default]
    Lowercase,
    Uppercase,
    Titlecase,
}

/// Changes the case of tags and removes duplicates
#[derive(Debug)]
pub struct NormalizeTags {
    case: TagCase,
    normalize_case: bool,
}

impl Default for NormalizeTags {
    fn default() -> Self {
        NormalizeTags { case: TagCase::default(), normalize_case: true }
    }
}

fn has_variable(value: &str) -> bool {
    ["${", "@{", "&{", "%{"].iter().any(|sigil| value.contains(sigil))
}

impl NormalizeTags {
    fn convert(&self, tag: &str) -> String {
        if !self.normalize_case || has_variable(tag) {
            return tag.to_string();
        }
        match self.case {
            TagCase::Lowercase => tag.to_lowercase(),
            TagCase::Uppercase => tag.to_uppercase(),
            TagCase::Titlecase => title_case(tag),
        }
    }

    /// Rewrites every line of a tag setting, dropping `...` lines left without tags.
    fn rewrite(&self, file: &SourceFile, statement: &Statement, config: &FormattingConfig, lines: &mut [Option<String>]) {
        let mut seen = HashSet::new();
        for number in statement.line..=statement.end_line {
            let Some(line) = file.line(number) else { continue };
            if number != statement.line && !line.is_continuation() {
                continue;
            }
            let Some((head, values)) = line.cells.split_first() else { continue };
            let tags: Vec<String> = values
                .iter()
                .map(|cell| self.convert(&cell.value))
                .filter(|tag| seen.insert(normalize_robot_name(tag)))
                .collect();
            let comment = line.comment.as_ref().map(|c| c.value.as_str());
            if number != statement.line && tags.is_empty() && comment.is_none() {
                lines[number - 1] = None;
                continue;
            }
            let cells: Vec<&str> =
                std::iter::once(head.value.as_str()).chain(tags.iter().map(String::as_str)).collect();
            let rebuilt = build_line(&indentation(line), &cells, comment, &config.separator);
            // untouched lines keep their original spacing
            let unchanged = tags.len() == values.len() && tags.iter().zip(values).all(|(t, c)| *t == c.value);
            if !unchanged {
                lines[number - 1] = Some(rebuilt);
            }
        }
    }
}

impl Formatter for NormalizeTags {
    fn name(&self) -> &'static str {
        "NormalizeTags"
    }

    fn docs(&self) -> &'static str {
        "Normalizes the case of tags in Test Tags, Force Tags, Default Tags, Keyword Tags and [Tags] \
         settings and removes duplicated tags. Tags containing variables keep their case."
    }

    fn enabled_by_default(&self) -> bool {
        false
    }

    fn params(&self) -> &'static [RuleParam] {
        &[
            RuleParam {
                name: "case",
                default: "lowercase",
                kind: ParamKind::Str,
                description: "target case: lowercase, uppercase or titlecase",
            },
            RuleParam {
                name: "normalize_case",
                default: "true",
                kind: ParamKind::Bool,
                description: "change the case of tags, only remove duplicates when disabled",
            },
        ]
    }

    fn set_param(&mut self, param: &str, value: ParamValue) -> RobocopResult<()> {
        match value {
            ParamValue::Str(case) => {
                self.case = match case.to_lowercase().as_str() {
                    "lowercase" => TagCase::Lowercase,
                    "uppercase" => TagCase::Uppercase,
                    "titlecase" => TagCase::Titlecase,
                    _ => return Err(invalid_choice(param, &case, "lowercase, uppercase, titlecase")),
                }
            }
            ParamValue::Bool(normalize_case) => self.normalize_case = normalize_case,
            _ => {}
        }
        Ok(())
    }

    fn format(&self, file: &SourceFile, config: &FormattingConfig) -> Option<String> {
        let mut lines: Vec<Option<String>> = file.lines.iter().map(|l| Some(l.text.clone())).collect();
        let block_statements = file
            .tests()
            .chain(file.keywords())
            .flat_map(|block| block.statements.iter().filter(move |s| s.line != block.line));
        for statement in file.settings().chain(block_statements) {
            let is_tag_setting = matches!(statement.kind, StatementKind::Setting | StatementKind::BlockSetting)
                && TAG_SETTINGS.contains(&statement.normalized_setting_name().as_str());
            if is_tag_setting {
                self.rewrite(file, statement, config, &mut lines);
            }
        }
        let lines: Vec<String> = lines.into_iter().flatten().collect();
        changed(file, &lines, file.ends_with_newline)
    }
}
