//! Inline `# robocop: off` / `# robocop: on` directives

use regex::Regex;

use super::rules::Rule;
use crate::model::SourceFile;

lazy_static! {
    static ref DIRECTIVE: Regex =
        Regex::new(r"(?i)#\s*robocop\s*:\s*(off|on)\b(?:\s*=\s*([\w\-]+(?:\s*,\s*[\w\-]+)*))?").expect("valid regex");
}

/// Rules a directive applies to, `None` for all of them
type RuleNames = Option<Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct DisabledRange {
    start: usize,
    end: usize,
    rules: RuleNames,
}

impl DisabledRange {
    fn covers(&self, rule: &Rule, line: usize) -> bool {
        self.start <= line && line <= self.end && applies_to(&self.rules, rule)
    }
}

fn applies_to(rules: &RuleNames, rule: &Rule) -> bool {
    match rules {
        None => true,
        Some(names) => names.iter().any(|name| {
            name.eq_ignore_ascii_case("all") || rule.name == name || rule.id.to_string().eq_ignore_ascii_case(name)
        }),
    }
}

fn parse_directive(comment: &str) -> Option<(bool, RuleNames)> {
    let captures = DIRECTIVE.captures(comment)?;
    let off = captures.get(1)?.as_str().eq_ignore_ascii_case("off");
    let rules = captures.get(2).map(|names| {
        names.as_str().split(',').map(|name| name.trim().to_string()).collect::<Vec<_>>()
    });
    Some((off, rules))
}

#[derive(Debug, Default)]
pub struct Disablers {
    ranges: Vec<DisabledRange>,
    file_disabled: bool,
}

impl Disablers {
    pub fn from_source(file: &SourceFile) -> Disablers {
        let first_header = file.lines.iter().find(|l| l.is_header()).map(|l| l.number);
        let mut ranges = Vec::new();
        let mut open: Vec<(usize, RuleNames)> = Vec::new();

        for line in &file.lines {
            let Some(comment) = &line.comment else { continue };
            let Some((off, rules)) = parse_directive(&comment.value) else { continue };
            if !line.is_comment_only() {
                if off {
                    ranges.push(DisabledRange { start: line.number, end: line.number, rules });
                }
                continue;
            }
            if off {
                open.push((line.number, rules));
                continue;
            }
            // `on` closes every region it names, or all of them
            let mut still_open = Vec::new();
            for (start, region_rules) in open.drain(..) {
                let closes = match (&rules, &region_rules) {
                    (None, _) => true,
                    (Some(names), Some(region_names)) => region_names.iter().all(|n| names.contains(n)),
                    (Some(_), None) => false,
                };
                if closes {
                    ranges.push(DisabledRange { start, end: line.number, rules: region_rules });
                } else {
                    still_open.push((start, region_rules));
                }
            }
            open = still_open;
        }

        let mut file_disabled = false;
        for (start, rules) in open {
            let before_sections = first_header.map_or(true, |header| start < header);
            if before_sections && rules.is_none() {
                file_disabled = true;
            }
            ranges.push(DisabledRange { start, end: usize::MAX, rules });
        }
        Disablers { ranges, file_disabled }
    }

    /// Whole file disabled by a leading `# robocop: off` that is never closed
    pub fn file_disabled(&self) -> bool {
        self.file_disabled
    }

    pub fn is_disabled(&self, rule: &Rule, line: usize) -> bool {
        self.file_disabled || self.ranges.iter().any(|range| range.covers(rule, line))
    }
}
