//! Quality gates: exit code derived from issue counts per severity

use std::collections::BTreeMap;

use super::{invalid_report_param, Report, RunSummary};
use crate::diagnostics::{Diagnostic, Severity};
use crate::errors::{RobocopError, RobocopResult};

const MAX_EXIT_CODE: i32 = 255;

pub struct ReturnStatus {
    /// Allowed number of issues per severity, `-1` disables the gate
    quality_gates: BTreeMap<Severity, i64>,
    counts: BTreeMap<Severity, i64>,
}

impl Default for ReturnStatus {
    fn default() -> Self {
        let quality_gates = [(Severity::Error, 0), (Severity::Warning, 0), (Severity::Info, -1)].into();
        ReturnStatus { quality_gates, counts: BTreeMap::new() }
    }
}

impl ReturnStatus {
    /// Parses `E=0:W=0:I=-1`; severities not listed keep their gate.
    fn set_quality_gates(&mut self, value: &str) -> RobocopResult<()> {
        let invalid = |message: &str| RobocopError::InvalidParamValue {
            param: "quality_gates".to_string(),
            value: value.to_string(),
            message: message.to_string(),
            kind: "str".to_string(),
        };
        for gate in value.split(':').filter(|g| !g.trim().is_empty()) {
            let (severity, limit) = gate.split_once('=').ok_or_else(|| invalid("expected <severity>=<limit>"))?;
            let severity: Severity = severity.trim().parse().map_err(|_| invalid("unknown severity"))?;
            let limit: i64 = limit.trim().parse().map_err(|_| invalid("limit is not a number"))?;
            self.quality_gates.insert(severity, limit);
        }
        Ok(())
    }

    pub fn compute(&self) -> i32 {
        let mut code: i64 = 0;
        for (severity, gate) in &self.quality_gates {
            let count = self.counts.get(severity).copied().unwrap_or(0);
            if -1 < *gate && *gate < count {
                code += count - gate;
            }
        }
        code.min(MAX_EXIT_CODE as i64) as i32
    }
}

impl Report for ReturnStatus {
    fn name(&self) -> &'static str {
        "return_status"
    }

    fn description(&self) -> &'static str {
        "Checks if number of specific issues exceed quality gates limits"
    }

    fn is_default(&self) -> bool {
        false
    }

    fn params(&self) -> &'static [&'static str] {
        &["quality_gates"]
    }

    fn configure(&mut self, param: &str, value: &str) -> RobocopResult<()> {
        match param {
            "quality_gates" => self.set_quality_gates(value),
            _ => Err(invalid_report_param(self.name(), param, self.params())),
        }
    }

    fn add_diagnostic(&mut self, diagnostic: &Diagnostic) {
        *self.counts.entry(diagnostic.severity).or_default() += 1;
    }

    fn finish(&mut self, _summary: &RunSummary) -> RobocopResult<Option<String>> {
        Ok(None)
    }

    fn exit_code(&self) -> Option<i32> {
        Some(self.compute())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::diagnostic;
    use super::*;
    use test_case::test_case;

    fn with_issues(errors: usize, warnings: usize, infos: usize) -> ReturnStatus {
        let mut report = ReturnStatus::default();
        for (severity, count) in [(Severity::Error, errors), (Severity::Warning, warnings), (Severity::Info, infos)] {
            for line in 0..count {
                report.add_diagnostic(&diagnostic("line-too-long", severity, "a.robot", line + 1));
            }
        }
        report
    }

    #[test_case(0, 0, 10, 0 ; "infos are not gated by default")]
    #[test_case(2, 3, 0, 5 ; "errors and warnings add up")]
    #[test_case(200, 100, 0, 255 ; "capped")]
    fn default_gates(errors: usize, warnings: usize, infos: usize, expected: i32) {
        assert_eq!(with_issues(errors, warnings, infos).compute(), expected);
    }

    #[test]
    fn configured_gates_allow_some_issues() {
        let mut report = with_issues(1, 5, 2);
        report.configure("quality_gates", "E=0:W=3:I=-1").unwrap();
        assert_eq!(report.compute(), 1 + 2);
    }

    #[test]
    fn invalid_gate_is_rejected() {
        let mut report = ReturnStatus::default();
        assert!(report.configure("quality_gates", "E0").is_err());
        assert!(report.configure("quality_gates", "X=1").is_err());
        assert!(report.configure("limits", "E=1").is_err());
    }
}
