use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Where a scout stands on a merit badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum RequirementStatus {
    NotStarted,
    InProgress,
    Completed,
    Awarded,
}

impl RequirementStatus {
    pub fn recognize(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "not started" => Some(RequirementStatus::NotStarted),
            "in progress" | "in-progress" | "started" => Some(RequirementStatus::InProgress),
            "completed" | "complete" | "leader approved" | "counselor approved" => {
                Some(RequirementStatus::Completed)
            }
            "awarded" => Some(RequirementStatus::Awarded),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RequirementStatus::NotStarted => "Not Started",
            RequirementStatus::InProgress => "In Progress",
            RequirementStatus::Completed => "Completed",
            RequirementStatus::Awarded => "Awarded",
        }
    }

    /// Completed and Awarded both count as finished work.
    pub fn is_completed(&self) -> bool {
        matches!(self, RequirementStatus::Completed | RequirementStatus::Awarded)
    }
}

impl std::fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Whether a merit badge counselor has been named for the badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum CounselorAssignment {
    Assigned,
    Unassigned,
    NoAssignment,
}

impl CounselorAssignment {
    pub fn from_field(counselor: &str) -> Self {
        let trimmed = counselor.trim();
        if trimmed.is_empty() {
            return CounselorAssignment::NoAssignment;
        }
        match trimmed.to_lowercase().as_str() {
            "none" | "n/a" | "tbd" | "to be determined" => CounselorAssignment::Unassigned,
            _ => CounselorAssignment::Assigned,
        }
    }
}

/// One entry from the exported "Requirements" cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(tag = "type", content = "requirement", rename_all = "snake_case")]
pub enum RequirementEntry {
    /// A single numbered requirement such as `5` or `10a`.
    Individual(String),
    /// A choice group such as `1 of 7a, 7b, 7c`.
    Choice(String),
    Other(String),
}

fn choice_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\([^)]+of[^)]+\)").expect("valid choice regex"))
}

fn individual_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+[a-z]*)").expect("valid requirement regex"))
}

fn badge_year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*\((\d{4})\)\s*$").expect("valid year regex"))
}

/// Parse the Scoutbook requirements cell.
///
/// `"5, 5g, (1 of 7a, 7b, 7c)"` yields two individual entries and one choice
/// group. "No Requirements Complete" yields nothing.
pub fn parse_requirements(raw: &str) -> Vec<RequirementEntry> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.to_lowercase().contains("no requirements complete") {
        return Vec::new();
    }

    let mut entries = Vec::new();
    for choice in choice_pattern().find_iter(trimmed) {
        let inner = &choice.as_str()[1..choice.as_str().len() - 1];
        entries.push(RequirementEntry::Choice(inner.trim().to_string()));
    }

    let remaining = choice_pattern().replace_all(trimmed, "");
    for part in remaining.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match individual_pattern().captures(part) {
            Some(caps) => entries.push(RequirementEntry::Individual(caps[1].to_string())),
            None => entries.push(RequirementEntry::Other(part.to_string())),
        }
    }

    entries
}

/// Split a badge name like `"Fire Safety (2025)"` into name and requirements year.
pub fn split_badge_year(name: &str) -> (String, Option<u16>) {
    let trimmed = name.trim();
    match badge_year_pattern().captures(trimmed) {
        Some(caps) => {
            let year = caps[1].parse().ok();
            let base = badge_year_pattern().replace(trimmed, "");
            (base.trim().to_string(), year)
        }
        None => (trimmed.to_string(), None),
    }
}

/// A scout's progress on one merit badge, keyed by (BSA number, merit badge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MeritBadgeProgress {
    pub bsa_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub merit_badge: String,
    pub badge_year: Option<u16>,
    pub status: Option<RequirementStatus>,
    pub start_date: Option<NaiveDate>,
    pub date_completed: Option<NaiveDate>,
    pub counselor: Option<String>,
    pub counselor_assignment: CounselorAssignment,
    pub location: Option<String>,
    #[serde(default)]
    pub requirements: Vec<RequirementEntry>,
}

impl MeritBadgeProgress {
    pub fn key(&self) -> (String, String) {
        (self.bsa_number.clone(), self.merit_badge.clone())
    }

    /// Completed when the status says so or a completion date was recorded.
    pub fn is_completed(&self) -> bool {
        self.status.map(|s| s.is_completed()).unwrap_or(false) || self.date_completed.is_some()
    }

    pub fn scout_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.bsa_number.clone(),
        }
    }
}
