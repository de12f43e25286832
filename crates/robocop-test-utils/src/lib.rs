pub mod assertions;
pub mod builders;
pub mod workspace;

pub use builders::SuiteBuilder;
pub use workspace::TestWorkspace;

// Re-export common types for convenience
pub use robocop_core::config::{FormatConfig, LintConfig};
pub use robocop_core::{Diagnostic, Severity};

/// Whether a diagnostic was raised by the rule with this name or id
pub fn is_rule(diagnostic: &Diagnostic, rule: &str) -> bool {
    diagnostic.rule_name == rule || diagnostic.rule_id.to_string().eq_ignore_ascii_case(rule)
}

/// One line per diagnostic, used in assertion failure messages
pub fn describe(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "  (no violations)".to_string();
    }
    diagnostics
        .iter()
        .map(|d| format!("  - {}:{} {} {} {}", d.line(), d.column(), d.rule_id, d.rule_name, d.message))
        .collect::<Vec<_>>()
        .join("\n")
}
