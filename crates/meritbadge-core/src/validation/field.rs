//! Single-field checks.
//!
//! Every check here is a pure function of the raw cell text and the rule that
//! applies to it. The row validator decides what to do with the outcome.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{ActivityStatus, RequirementStatus, ScoutRank};
use crate::utils::digits_only;

use super::rules::{FieldKind, FieldRule, Presence};

/// Date formats accepted in roster and progress exports, tried in order.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2023-12-31
    "%m/%d/%Y", // 12/31/2023
    "%m-%d-%Y", // 12-31-2023
    "%Y/%m/%d", // 2023/12/31
    "%d/%m/%Y", // 31/12/2023
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Valid,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutcome {
    pub severity: Severity,
    pub message: Option<String>,
}

impl FieldOutcome {
    pub fn valid() -> Self {
        Self {
            severity: Severity::Valid,
            message: None,
        }
    }

    pub fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: Some(message.into()),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    pub fn is_valid(&self) -> bool {
        self.severity == Severity::Valid
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
    })
}

/// Parse a date in any of the accepted export formats.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// BSA numbers are all digits, `min..=max` long.
pub fn is_valid_bsa_number(value: &str, min_digits: usize, max_digits: usize) -> bool {
    !value.is_empty()
        && value.chars().all(|c| c.is_ascii_digit())
        && (min_digits..=max_digits).contains(&value.len())
}

pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value)
}

/// US phone numbers: 10 or 11 digits once punctuation is removed.
pub fn is_valid_phone(value: &str) -> bool {
    (10..=11).contains(&digits_only(value).len())
}

fn choices<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check one raw cell against its rule.
pub fn check_field(rule: &FieldRule, raw: &str) -> FieldOutcome {
    let value = raw.trim();

    if value.is_empty() {
        return match rule.presence {
            Presence::Required => FieldOutcome::error(format!("{} is required", rule.label)),
            Presence::Recommended => FieldOutcome::warning(format!("{} is missing", rule.label)),
            Presence::Optional => FieldOutcome::valid(),
        };
    }

    match &rule.kind {
        FieldKind::Text => FieldOutcome::valid(),
        FieldKind::BsaNumber {
            min_digits,
            max_digits,
        } => {
            if is_valid_bsa_number(value, *min_digits, *max_digits) {
                FieldOutcome::valid()
            } else {
                FieldOutcome::with_severity(
                    rule.malformed,
                    format!("Invalid BSA number format '{}'", value),
                )
            }
        }
        FieldKind::Email => {
            if is_valid_email(value) {
                FieldOutcome::valid()
            } else {
                FieldOutcome::with_severity(rule.malformed, format!("Invalid email format '{}'", value))
            }
        }
        FieldKind::Phone => {
            if is_valid_phone(value) {
                FieldOutcome::valid()
            } else {
                FieldOutcome::with_severity(
                    rule.malformed,
                    format!("Phone number format may be invalid '{}'", value),
                )
            }
        }
        FieldKind::Date => {
            if parse_date(value).is_some() {
                FieldOutcome::valid()
            } else {
                FieldOutcome::with_severity(
                    rule.malformed,
                    format!("Invalid date format for {} '{}'", rule.column, value),
                )
            }
        }
        FieldKind::Age { min, max } => match value.parse::<u32>() {
            Ok(age) if (*min..=*max).contains(&age) => FieldOutcome::valid(),
            Ok(age) => FieldOutcome::warning(format!(
                "Age {} seems unusual for a Scout ({}-{} typical range)",
                age, min, max
            )),
            Err(_) => FieldOutcome::with_severity(
                rule.malformed,
                format!("Age must be a number, got '{}'", value),
            ),
        },
        FieldKind::Rank { unknown } => match ScoutRank::recognize(value) {
            Some(_) => FieldOutcome::valid(),
            None => FieldOutcome::with_severity(
                *unknown,
                format!("Invalid rank '{}'. Valid ranks: {}", value, choices(&ScoutRank::ALL)),
            ),
        },
        FieldKind::ActivityStatus { unknown } => match ActivityStatus::recognize(value) {
            Some(_) => FieldOutcome::valid(),
            None => FieldOutcome::with_severity(
                *unknown,
                format!(
                    "Invalid activity status '{}'. Valid statuses: {}",
                    value,
                    choices(&ActivityStatus::ALL)
                ),
            ),
        },
        FieldKind::RequirementStatus { unknown } => match RequirementStatus::recognize(value) {
            Some(_) => FieldOutcome::valid(),
            None => FieldOutcome::with_severity(
                *unknown,
                format!("Invalid requirement status '{}'", value),
            ),
        },
    }
}
