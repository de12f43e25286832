use super::{changed, replace_cell, Formatter, FormattingConfig};
use crate::linter::rules::{ParamKind, ParamValue, RuleParam};
use crate::model::SourceFile;
use crate::errors::RobocopResult;

/// Section headers in their canonical spelling, e.g. `*** Test Cases ***`
#[derive(Debug, Default)]
pub struct NormalizeSectionHeaderName {
    uppercase: bool,
}

impl Formatter for NormalizeSectionHeaderName {
    fn name(&self) -> &'static str {
        "NormalizeSectionHeaderName"
    }

    fn docs(&self) -> &'static str {
        "Normalizes section headers to `*** Settings ***`, `*** Variables ***`, `*** Test Cases ***`, \
         `*** Tasks ***`, `*** Keywords ***` and `*** Comments ***`. With uppercase=True the name is \
         written in capital letters."
    }

    fn params(&self) -> &'static [RuleParam] {
        &[RuleParam {
            name: "uppercase",
            default: "false",
            kind: ParamKind::Bool,
            description: "write section names in upper case",
        }]
    }

    fn set_param(&mut self, _param: &str, value: ParamValue) -> RobocopResult<()> {
        if let ParamValue::Bool(uppercase) = value {
            self.uppercase = uppercase;
        }
        Ok(())
    }

    fn format(&self, file: &SourceFile, _config: &FormattingConfig) -> Option<String> {
        let mut lines: Vec<String> = file.lines.iter().map(|l| l.text.clone()).collect();
        for section in &file.sections {
            let (Some(header), Some(number)) = (&section.header, section.header_line) else { continue };
            let Some(name) = section.kind.canonical_name() else { continue };
            let name = if self.uppercase { name.to_uppercase() } else { name.to_string() };
            lines[number - 1] = replace_cell(&lines[number - 1], header, &format!("*** {} ***", name));
        }
        changed(file, &lines, file.ends_with_newline)
    }
}
