//! Rule sets for each supported export.

use serde::{Deserialize, Serialize};

use crate::models::split_badge_year;
use crate::utils::normalize_header;

use super::field::Severity;
use super::row::Row;

/// The CSV exports the importer understands.
///
/// Variant order is the order results are reported and files are imported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    YouthRoster,
    AdultRoster,
    MeritBadgeProgress,
}

impl FileType {
    pub const ALL: [FileType; 3] = [
        FileType::YouthRoster,
        FileType::AdultRoster,
        FileType::MeritBadgeProgress,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FileType::YouthRoster => "Youth Roster",
            FileType::AdultRoster => "Adult Roster",
            FileType::MeritBadgeProgress => "Merit Badge Progress",
        }
    }

    /// The youth roster is the primary export; a run without it cannot pass.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, FileType::YouthRoster)
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tunable Warning/Error boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    pub bsa_min_digits: usize,
    pub bsa_max_digits: usize,
    pub min_age: u32,
    pub max_age: u32,
    pub unknown_rank: Severity,
    pub unknown_activity_status: Severity,
    pub unknown_requirement_status: Severity,
    pub implausible_dates: Severity,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            bsa_min_digits: 6,
            bsa_max_digits: 12,
            min_age: 6,
            max_age: 21,
            unknown_rank: Severity::Warning,
            unknown_activity_status: Severity::Error,
            unknown_requirement_status: Severity::Error,
            implausible_dates: Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Empty value is an error.
    Required,
    /// Empty value is a warning.
    Recommended,
    /// Empty value is fine.
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    BsaNumber { min_digits: usize, max_digits: usize },
    Email,
    Phone,
    Date,
    Age { min: u32, max: u32 },
    Rank { unknown: Severity },
    ActivityStatus { unknown: Severity },
    RequirementStatus { unknown: Severity },
}

/// A named check bound to one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub column: &'static str,
    pub label: &'static str,
    pub presence: Presence,
    pub kind: FieldKind,
    /// Severity for a present but unparseable value.
    pub malformed: Severity,
}

impl FieldRule {
    pub fn required(column: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            column,
            label,
            presence: Presence::Required,
            kind,
            malformed: Severity::Error,
        }
    }

    pub fn recommended(column: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            column,
            label,
            presence: Presence::Recommended,
            kind,
            malformed: Severity::Warning,
        }
    }

    pub fn optional(column: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            column,
            label,
            presence: Presence::Optional,
            kind,
            malformed: Severity::Warning,
        }
    }

    pub fn malformed_as(mut self, severity: Severity) -> Self {
        self.malformed = severity;
        self
    }
}

/// Checks that look at more than one column of the same row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossCheck {
    /// `later` must not precede `earlier` when both are valid dates.
    DateOrder {
        earlier: &'static str,
        later: &'static str,
        severity: Severity,
    },
    /// A completed status should come with a completion date.
    CompletedHasDate {
        status: &'static str,
        completed: &'static str,
        severity: Severity,
    },
}

/// One column of a file's unique key and how its values are compared.
#[derive(Debug, Clone, Copy)]
pub struct KeyColumn {
    pub column: &'static str,
    pub normalize: fn(&str) -> String,
}

impl KeyColumn {
    /// Compared case-insensitively.
    pub fn text(column: &'static str) -> Self {
        Self {
            column,
            normalize: str::to_lowercase,
        }
    }

    /// A merit badge name, compared without its requirements year, as it is stored.
    pub fn badge(column: &'static str) -> Self {
        Self {
            column,
            normalize: |value| split_badge_year(value).0.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    pub file_type: FileType,
    pub required_columns: Vec<&'static str>,
    pub optional_columns: Vec<&'static str>,
    /// Normalized export headings mapped onto canonical column names.
    pub aliases: Vec<(&'static str, &'static str)>,
    /// A row with this column empty cannot be attributed and is skipped.
    pub identity_column: &'static str,
    pub identity_label: &'static str,
    /// Columns that together identify a record within one file.
    pub unique_key: Vec<KeyColumn>,
    pub fields: Vec<FieldRule>,
    pub cross_checks: Vec<CrossCheck>,
}

impl RuleSet {
    pub fn for_file_type(file_type: FileType, policy: &ValidationPolicy) -> Self {
        match file_type {
            FileType::YouthRoster => Self::youth_roster(policy),
            FileType::AdultRoster => Self::adult_roster(policy),
            FileType::MeritBadgeProgress => Self::merit_badge_progress(policy),
        }
    }

    fn bsa_number(policy: &ValidationPolicy) -> FieldRule {
        FieldRule::required(
            "bsa_number",
            "BSA number",
            FieldKind::BsaNumber {
                min_digits: policy.bsa_min_digits,
                max_digits: policy.bsa_max_digits,
            },
        )
    }

    fn youth_roster(policy: &ValidationPolicy) -> Self {
        Self {
            file_type: FileType::YouthRoster,
            required_columns: vec!["bsa_number", "first_name", "last_name", "rank", "activity_status"],
            optional_columns: vec![
                "id",
                "unit_number",
                "date_joined",
                "date_of_birth",
                "age",
                "patrol_name",
                "oa_info",
                "email",
                "phone",
                "address_line1",
                "address_line2",
                "city",
                "state",
                "zip",
                "positions_tenure",
                "training_raw",
            ],
            aliases: vec![
                ("member_id", "bsa_number"),
                ("bsa_member_id", "bsa_number"),
                ("patrol", "patrol_name"),
                ("status", "activity_status"),
                ("positions_(tenure)", "positions_tenure"),
            ],
            identity_column: "bsa_number",
            identity_label: "BSA number",
            unique_key: vec![KeyColumn::text("bsa_number")],
            fields: vec![
                Self::bsa_number(policy),
                FieldRule::required("first_name", "First name", FieldKind::Text),
                FieldRule::required("last_name", "Last name", FieldKind::Text),
                FieldRule::recommended("rank", "Rank", FieldKind::Rank {
                    unknown: policy.unknown_rank,
                }),
                FieldRule::recommended("activity_status", "Activity status", FieldKind::ActivityStatus {
                    unknown: policy.unknown_activity_status,
                }),
                FieldRule::optional("date_joined", "Date joined", FieldKind::Date),
                FieldRule::optional("date_of_birth", "Date of birth", FieldKind::Date),
                FieldRule::optional("age", "Age", FieldKind::Age {
                    min: policy.min_age,
                    max: policy.max_age,
                }),
                FieldRule::optional("email", "Email", FieldKind::Email),
                FieldRule::optional("phone", "Phone", FieldKind::Phone),
            ],
            cross_checks: Vec::new(),
        }
    }

    fn adult_roster(policy: &ValidationPolicy) -> Self {
        Self {
            file_type: FileType::AdultRoster,
            required_columns: vec!["bsa_number", "first_name", "last_name"],
            optional_columns: vec![
                "id",
                "email",
                "city",
                "state",
                "zip",
                "age_category",
                "date_joined",
                "unit_number",
                "oa_info",
                "health_form_status",
                "swim_class",
                "swim_class_date",
                "positions_tenure",
                "merit_badges",
            ],
            aliases: vec![
                ("member_id", "bsa_number"),
                ("bsa_member_id", "bsa_number"),
                ("positions_(tenure)", "positions_tenure"),
            ],
            identity_column: "bsa_number",
            identity_label: "BSA number",
            unique_key: vec![KeyColumn::text("bsa_number")],
            fields: vec![
                Self::bsa_number(policy),
                FieldRule::required("first_name", "First name", FieldKind::Text),
                FieldRule::required("last_name", "Last name", FieldKind::Text),
                FieldRule::optional("email", "Email", FieldKind::Email),
                FieldRule::optional("date_joined", "Date joined", FieldKind::Date),
                FieldRule::optional("swim_class_date", "Swim class date", FieldKind::Date),
            ],
            cross_checks: Vec::new(),
        }
    }

    fn merit_badge_progress(policy: &ValidationPolicy) -> Self {
        Self {
            file_type: FileType::MeritBadgeProgress,
            required_columns: vec![
                "bsa_number",
                "merit_badge",
                "requirement_status",
                "start_date",
                "date_completed",
            ],
            optional_columns: vec![
                "id",
                "first_name",
                "last_name",
                "rank",
                "location",
                "counselor",
                "requirements",
            ],
            aliases: vec![
                ("member_id", "bsa_number"),
                ("scout_first", "first_name"),
                ("scout_last", "last_name"),
                ("mbc", "counselor"),
                ("status", "requirement_status"),
                ("date_started", "start_date"),
            ],
            identity_column: "bsa_number",
            identity_label: "BSA number",
            unique_key: vec![KeyColumn::text("bsa_number"), KeyColumn::badge("merit_badge")],
            fields: vec![
                Self::bsa_number(policy),
                FieldRule::recommended("first_name", "Scout first name", FieldKind::Text),
                FieldRule::recommended("last_name", "Scout last name", FieldKind::Text),
                FieldRule::required("merit_badge", "Merit badge", FieldKind::Text),
                FieldRule::required("requirement_status", "Requirement status", FieldKind::RequirementStatus {
                    unknown: policy.unknown_requirement_status,
                }),
                FieldRule::recommended("start_date", "Start date", FieldKind::Date),
                FieldRule::optional("date_completed", "Date completed", FieldKind::Date),
            ],
            cross_checks: vec![
                CrossCheck::DateOrder {
                    earlier: "start_date",
                    later: "date_completed",
                    severity: policy.implausible_dates,
                },
                CrossCheck::CompletedHasDate {
                    status: "requirement_status",
                    completed: "date_completed",
                    severity: policy.implausible_dates,
                },
            ],
        }
    }

    /// Map an export heading to the canonical column name.
    pub fn canonical_column(&self, header: &str) -> String {
        let normalized = normalize_header(header);
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, canonical)| canonical.to_string())
            .unwrap_or(normalized)
    }

    /// The row's unique key, normalized per key column.
    pub fn record_key(&self, row: &Row) -> String {
        self.unique_key
            .iter()
            .map(|key| (key.normalize)(row.get(key.column)))
            .collect::<Vec<_>>()
            .join("\u{1f}")
    }

    pub fn is_known_column(&self, column: &str) -> bool {
        self.required_columns.contains(&column) || self.optional_columns.contains(&column)
    }

    /// Required columns absent from `present`, in declaration order.
    pub fn missing_columns(&self, present: &[String]) -> Vec<&'static str> {
        self.required_columns
            .iter()
            .copied()
            .filter(|required| !present.iter().any(|p| p == required))
            .collect()
    }
}
