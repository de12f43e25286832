//! Common assertion macros for robocop tests
//!
//! Every macro takes something that derefs to `[Diagnostic]` and a rule given
//! either by name (`line-too-long`) or by id (`LEN08`).

/// Assert that a rule reported a violation on a line, optionally at a column
#[macro_export]
macro_rules! assert_violation_at {
    ($diagnostics:expr, $rule:expr, $line:expr) => {
        let diagnostics: &[$crate::Diagnostic] = &$diagnostics;
        let found = diagnostics.iter().any(|d| $crate::is_rule(d, $rule) && d.line() == $line);
        assert!(
            found,
            "Expected '{}' at line {}, but got:\n{}",
            $rule,
            $line,
            $crate::describe(diagnostics)
        );
    };
    ($diagnostics:expr, $rule:expr, $line:expr, $column:expr) => {
        let diagnostics: &[$crate::Diagnostic] = &$diagnostics;
        let found = diagnostics
            .iter()
            .any(|d| $crate::is_rule(d, $rule) && d.line() == $line && d.column() == $column);
        assert!(
            found,
            "Expected '{}' at {}:{}, but got:\n{}",
            $rule,
            $line,
            $column,
            $crate::describe(diagnostics)
        );
    };
}

/// Assert that nothing was reported, or nothing by one rule
#[macro_export]
macro_rules! assert_no_violations {
    ($diagnostics:expr) => {
        let diagnostics: &[$crate::Diagnostic] = &$diagnostics;
        if !diagnostics.is_empty() {
            panic!("Expected no violations, but got:\n{}", $crate::describe(diagnostics));
        }
    };
    ($diagnostics:expr, $rule:expr) => {
        let diagnostics: &[$crate::Diagnostic] = &$diagnostics;
        if diagnostics.iter().any(|d| $crate::is_rule(d, $rule)) {
            panic!("Expected no '{}' violations, but got:\n{}", $rule, $crate::describe(diagnostics));
        }
    };
}

/// Assert the number of violations reported by a rule
#[macro_export]
macro_rules! assert_violation_count {
    ($diagnostics:expr, $rule:expr, $count:expr) => {
        let diagnostics: &[$crate::Diagnostic] = &$diagnostics;
        let count = diagnostics.iter().filter(|d| $crate::is_rule(d, $rule)).count();
        assert_eq!(
            count,
            $count,
            "Expected {} '{}' violation(s), but got:\n{}",
            $count,
            $rule,
            $crate::describe(diagnostics)
        );
    };
}

/// Assert that a rule reported a violation whose message contains a pattern
#[macro_export]
macro_rules! assert_violation_message_contains {
    ($diagnostics:expr, $rule:expr, $pattern:expr) => {
        let diagnostics: &[$crate::Diagnostic] = &$diagnostics;
        let pattern = $pattern;
        let found = diagnostics.iter().any(|d| $crate::is_rule(d, $rule) && d.message.contains(pattern));
        if !found {
            panic!(
                "Expected '{}' violation containing '{}', but got:\n{}",
                $rule,
                pattern,
                $crate::describe(diagnostics)
            );
        }
    };
}
