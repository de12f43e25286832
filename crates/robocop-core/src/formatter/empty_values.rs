use super::{build_line, changed, indentation, Formatter, FormattingConfig};
use crate::model::names::variable_sigil;
use crate::model::SourceFile;

/// Fills variables declared without a value with `${EMPTY}`, `@{EMPTY}` or `&{EMPTY}`
#[derive(Debug, Default)]
pub struct ReplaceEmptyValues;

fn empty_value(name: &str) -> String {
    format!("{}{{EMPTY}}", variable_sigil(name))
}

impl Formatter for ReplaceEmptyValues {
    fn name(&self) -> &'static str {
        "ReplaceEmptyValues"
    }

    fn docs(&self) -> &'static str {
        "Replaces empty values in the Variables section with ${EMPTY}, @{EMPTY} or &{EMPTY} \
         depending on the variable type."
    }

    fn format(&self, file: &SourceFile, config: &FormattingConfig) -> Option<String> {
        let mut lines: Vec<String> = file.lines.iter().map(|l| l.text.clone()).collect();
        for statement in file.variables() {
            let Some(line) = file.line(statement.line) else { continue };
            let comment = line.comment.as_ref().map(|c| c.value.as_str());
            if statement.args.is_empty() {
                let value = empty_value(&statement.name.value);
                lines[line.number - 1] = build_line(
                    &indentation(line),
                    &[statement.name.value.as_str(), value.as_str()],
                    comment,
                    &config.separator,
                );
                continue;
            }
            // `...` lines left without a value inside a multi-line declaration
            for number in statement.line + 1..=statement.end_line {
                let Some(continuation) = file.line(number) else { continue };
                if continuation.is_continuation() && continuation.cells.len() == 1 {
                    let comment = continuation.comment.as_ref().map(|c| c.value.as_str());
                    lines[number - 1] = build_line(
                        &indentation(continuation),
                        &["...", "${EMPTY}"],
                        comment,
                        &config.separator,
                    );
                }
            }
        }
        changed(file, &lines, file.ends_with_newline)
    }
}
