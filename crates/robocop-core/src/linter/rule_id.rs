//! Rule identifiers: a group code followed by two digits, e.g. `DOC01`

use std::fmt;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Rule groups, the alphabetic prefix of every rule id
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsRefStr,      // Provides as_ref() -> &str
    Display,       // Provides to_string()
    EnumString,    // Provides from_str()
    IntoStaticStr, // Provides into() -> &'static str
    EnumIter,      // Provides iter() over all variants
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RuleGroup {
    Doc,
    Dup,
    Spc,
    Len,
    Tag,
    Name,
    Depr,
    Misc,
}

impl RuleGroup {
    pub const fn description(&self) -> &'static str {
        use RuleGroup::*;
        match self {
            Doc => "Missing or incomplete documentation",
            Dup => "Duplicated definitions, imports and sections",
            Spc => "Whitespace, empty lines and indentation",
            Len => "Sizes of keywords, test cases, lines and files",
            Tag => "Test and keyword tags",
            Name => "Naming conventions",
            Depr => "Deprecated syntax",
            Misc => "Other code quality checks",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId {
    pub group: RuleGroup,
    pub number: u8,
}

impl RuleId {
    pub const fn new(group: RuleGroup, number: u8) -> Self {
        RuleId { group, number }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.group, self.number)
    }
}

impl FromStr for RuleId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("'{}' is not a valid rule id", value);
        let split = value.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let (prefix, digits) = value.split_at(split);
        let valid_prefix =
            (2..=4).contains(&prefix.len()) && prefix.chars().all(|c| c.is_ascii_uppercase());
        if !valid_prefix || digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let group = RuleGroup::from_str(prefix).map_err(|_| invalid())?;
        let number = digits.parse().map_err(|_| invalid())?;
        Ok(RuleId { group, number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("DOC01", RuleGroup::Doc, 1)]
    #[test_case("NAME04", RuleGroup::Name, 4)]
    #[test_case("MISC12", RuleGroup::Misc, 12)]
    fn parses_valid_ids(value: &str, group: RuleGroup, number: u8) {
        let id: RuleId = value.parse().unwrap();
        assert_eq!(id, RuleId::new(group, number));
        assert_eq!(id.to_string(), value);
    }

    #[test_case("doc01" ; "lowercase")]
    #[test_case("DOC1" ; "one digit")]
    #[test_case("DOC001" ; "three digits")]
    #[test_case("XYZ01" ; "unknown group")]
    #[test_case("D01" ; "short prefix")]
    #[test_case("line-too-long" ; "rule name")]
    fn rejects_invalid_ids(value: &str) {
        assert!(value.parse::<RuleId>().is_err());
    }

    #[test]
    fn groups_sort_by_declaration() {
        assert!(RuleId::new(RuleGroup::Doc, 9) < RuleId::new(RuleGroup::Dup, 1));
    }
}
